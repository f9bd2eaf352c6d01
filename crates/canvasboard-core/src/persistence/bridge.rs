//! Save dialog state and the bridge that turns editor requests into API calls.

use super::{
    BoxFuture, CanvasApi, CanvasDocument, IdentityProvider, NewCanvas, PersistenceError,
    PersistenceResult,
};
use std::sync::Arc;

/// State of the save dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveDialog {
    #[default]
    Closed,
    /// Editing the name; submit is enabled once it is non-blank.
    Open { name: String },
    /// A save is in flight.
    Submitting { name: String },
}

impl SaveDialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, SaveDialog::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SaveDialog::Submitting { .. })
    }

    /// Whether the save button is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self, SaveDialog::Open { name } if !name.trim().is_empty())
    }

    /// Open with an empty name. No-op unless closed.
    pub fn open(&mut self) {
        if matches!(self, SaveDialog::Closed) {
            *self = SaveDialog::Open {
                name: String::new(),
            };
        }
    }

    /// Update the name field. Ignored unless the dialog is open.
    pub fn set_name(&mut self, value: impl Into<String>) {
        if let SaveDialog::Open { name } = self {
            *name = value.into();
        }
    }

    /// Close without saving. Only possible before submission.
    pub fn cancel(&mut self) -> bool {
        if matches!(self, SaveDialog::Open { .. }) {
            *self = SaveDialog::Closed;
            true
        } else {
            false
        }
    }

    /// Move to `Submitting`, returning the trimmed name.
    pub fn submit(&mut self) -> PersistenceResult<String> {
        match self {
            SaveDialog::Open { name } if !name.trim().is_empty() => {
                let name = name.trim().to_string();
                *self = SaveDialog::Submitting { name: name.clone() };
                Ok(name)
            }
            SaveDialog::Open { .. } => {
                Err(PersistenceError::Validation("Canvas name is required".into()))
            }
            SaveDialog::Submitting { .. } => {
                Err(PersistenceError::Validation("A save is already in progress".into()))
            }
            SaveDialog::Closed => Err(PersistenceError::Validation("Save dialog is closed".into())),
        }
    }

    /// Close after the submission completed, whatever the outcome.
    pub fn finish(&mut self) {
        *self = SaveDialog::Closed;
    }
}

/// Everything a save needs, captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub canvas_data: String,
}

/// Identifies one load request; only the latest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) seq: u64,
    pub(crate) canvas_id: uuid::Uuid,
}

impl LoadTicket {
    pub fn canvas_id(&self) -> uuid::Uuid {
        self.canvas_id
    }
}

/// Fixed identity, e.g. from configuration.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user_id: String,
    token: String,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    fn token(&self) -> BoxFuture<'_, PersistenceResult<String>> {
        let token = self.token.clone();
        Box::pin(async move { Ok(token) })
    }
}

/// Issues storage calls on behalf of the editor.
///
/// Returned futures own everything they need, so they can run while the
/// session keeps handling input.
#[derive(Clone)]
pub struct PersistenceBridge {
    api: Arc<dyn CanvasApi>,
    identity: Arc<dyn IdentityProvider>,
}

impl PersistenceBridge {
    pub fn new(api: Arc<dyn CanvasApi>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { api, identity }
    }

    fn user_id(&self) -> PersistenceResult<String> {
        self.identity
            .user_id()
            .ok_or_else(|| PersistenceError::Unauthorized("not signed in".into()))
    }

    /// Create a new document from a save request.
    pub fn save(
        &self,
        request: SaveRequest,
    ) -> BoxFuture<'static, PersistenceResult<CanvasDocument>> {
        let bridge = self.clone();
        Box::pin(async move {
            let user_id = bridge.user_id()?;
            let token = bridge.identity.token().await?;
            log::info!("saving canvas '{}' for {}", request.name, user_id);
            bridge
                .api
                .create_canvas(
                    &token,
                    NewCanvas {
                        canvas_data: request.canvas_data,
                        user_id,
                        name: request.name,
                    },
                )
                .await
        })
    }

    /// The signed-in user's documents, newest first.
    pub fn list(&self) -> BoxFuture<'static, PersistenceResult<Vec<CanvasDocument>>> {
        let bridge = self.clone();
        Box::pin(async move {
            let user_id = bridge.user_id()?;
            let token = bridge.identity.token().await?;
            bridge.api.list_canvases(&token, &user_id).await
        })
    }

    /// Fetch one of the signed-in user's documents.
    pub fn load(
        &self,
        canvas_id: uuid::Uuid,
    ) -> BoxFuture<'static, PersistenceResult<CanvasDocument>> {
        let bridge = self.clone();
        Box::pin(async move {
            let user_id = bridge.user_id()?;
            let token = bridge.identity.token().await?;
            log::debug!("loading canvas {canvas_id}");
            bridge
                .api
                .get_canvas(&token, &user_id, &canvas_id.to_string())
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryCanvasApi, block_on};

    #[test]
    fn test_dialog_flow() {
        let mut dialog = SaveDialog::default();
        assert!(!dialog.can_submit());
        dialog.open();
        assert!(!dialog.can_submit());
        dialog.set_name("   ");
        assert!(!dialog.can_submit());
        assert!(matches!(dialog.submit(), Err(PersistenceError::Validation(_))));

        dialog.set_name(" Plan ");
        assert!(dialog.can_submit());
        assert_eq!(dialog.submit().unwrap(), "Plan");
        assert!(dialog.is_submitting());
        assert!(!dialog.cancel());
        assert!(dialog.submit().is_err());

        dialog.finish();
        assert_eq!(dialog, SaveDialog::Closed);
    }

    #[test]
    fn test_cancel_from_open() {
        let mut dialog = SaveDialog::default();
        dialog.open();
        dialog.set_name("draft");
        assert!(dialog.cancel());
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_bridge_save_list_load() {
        let api = Arc::new(MemoryCanvasApi::new().with_user("u1"));
        let bridge = PersistenceBridge::new(api, Arc::new(StaticIdentity::new("u1", "tok")));

        let saved = block_on(bridge.save(SaveRequest {
            name: "Board".into(),
            canvas_data: "{\"x\":1}".into(),
        }))
        .unwrap();
        assert_eq!(saved.user_id, "u1");

        let list = block_on(bridge.list()).unwrap();
        assert_eq!(list.len(), 1);

        let loaded = block_on(bridge.load(saved.id)).unwrap();
        assert_eq!(loaded.canvas_data, "{\"x\":1}");
    }

    #[test]
    fn test_bridge_unknown_user() {
        let api = Arc::new(MemoryCanvasApi::new());
        let bridge = PersistenceBridge::new(api, Arc::new(StaticIdentity::new("nobody", "tok")));
        let result = block_on(bridge.save(SaveRequest {
            name: "Board".into(),
            canvas_data: "{}".into(),
        }));
        assert!(matches!(result, Err(PersistenceError::NotFound(m)) if m == "User not found"));
    }
}
