use crate::auth::TokenVerifier;
use crate::store::Store;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            store: Arc::new(Store::new()),
            verifier: Arc::new(verifier),
        }
    }
}
