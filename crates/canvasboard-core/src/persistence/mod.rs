//! Persistence bridge to the canvas storage API.

mod api;
mod bridge;
#[cfg(feature = "http-client")]
mod http;
mod memory;

pub use api::{
    CanvasDocument, CanvasEnvelope, CanvasListEnvelope, ErrorEnvelope, NewCanvas,
    SaveCanvasEnvelope, SignInRequest, User, UserEnvelope,
};
pub use bridge::{LoadTicket, PersistenceBridge, SaveDialog, SaveRequest, StaticIdentity};
#[cfg(feature = "http-client")]
pub use http::HttpCanvasApi;
pub use memory::MemoryCanvasApi;

use crate::scene::SceneError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Persistence errors, classified by how the session reacts to them.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    /// Network or server trouble; the same request may succeed later.
    #[error("request failed: {0}")]
    Transient(String),
    #[error("stored canvas could not be read: {0}")]
    InvalidDocument(#[from] SceneError),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Boxed future for async operations. `Send` so hosts can spawn it.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Client side of the storage API. Every call carries a bearer token.
pub trait CanvasApi: Send + Sync {
    /// Store a new canvas document.
    fn create_canvas(
        &self,
        token: &str,
        canvas: NewCanvas,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>>;

    /// All documents owned by a user, newest first.
    fn list_canvases(
        &self,
        token: &str,
        user_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<Vec<CanvasDocument>>>;

    /// One document owned by a user.
    fn get_canvas(
        &self,
        token: &str,
        user_id: &str,
        canvas_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>>;
}

/// Source of the signed-in user's identity and session token.
pub trait IdentityProvider: Send + Sync {
    /// External id of the signed-in user, if any.
    fn user_id(&self) -> Option<String>;

    /// Fetch a fresh bearer token.
    fn token(&self) -> BoxFuture<'_, PersistenceResult<String>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
