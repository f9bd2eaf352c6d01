//! In-memory storage API for tests and offline use.

use super::{BoxFuture, CanvasApi, CanvasDocument, NewCanvas, PersistenceError, PersistenceResult};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Storage API double with the same contract as the server.
#[derive(Default)]
pub struct MemoryCanvasApi {
    users: RwLock<HashSet<String>>,
    documents: RwLock<HashMap<Uuid, CanvasDocument>>,
    offline: AtomicBool,
}

fn lock_error(e: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::Transient(format!("Lock error: {e}"))
}

impl MemoryCanvasApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so saves for them succeed.
    pub fn with_user(self, user_id: impl Into<String>) -> Self {
        if let Ok(mut users) = self.users.write() {
            users.insert(user_id.into());
        }
        self
    }

    /// While offline, every call fails with a transient error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().map_or(0, |docs| docs.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, token: &str) -> PersistenceResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transient("storage unreachable".into()));
        }
        if token.is_empty() {
            return Err(PersistenceError::Unauthorized("missing token".into()));
        }
        Ok(())
    }

    fn user_exists(&self, user_id: &str) -> PersistenceResult<bool> {
        let users = self.users.read().map_err(lock_error)?;
        Ok(users.contains(user_id))
    }
}

impl CanvasApi for MemoryCanvasApi {
    fn create_canvas(
        &self,
        token: &str,
        canvas: NewCanvas,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>> {
        let checked = self.check(token);
        Box::pin(async move {
            checked?;
            if canvas.name.trim().is_empty() {
                return Err(PersistenceError::Validation("Canvas name is required".into()));
            }
            if !self.user_exists(&canvas.user_id)? {
                return Err(PersistenceError::NotFound("User not found".into()));
            }
            let now = Utc::now();
            let document = CanvasDocument {
                id: Uuid::new_v4(),
                user_id: canvas.user_id,
                name: canvas.name.trim().to_string(),
                canvas_data: canvas.canvas_data,
                created_at: now,
                updated_at: now,
            };
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.insert(document.id, document.clone());
            Ok(document)
        })
    }

    fn list_canvases(
        &self,
        token: &str,
        user_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<Vec<CanvasDocument>>> {
        let checked = self.check(token);
        let user_id = user_id.to_string();
        Box::pin(async move {
            checked?;
            if !self.user_exists(&user_id)? {
                return Err(PersistenceError::NotFound("User not found".into()));
            }
            let docs = self.documents.read().map_err(lock_error)?;
            let mut owned: Vec<_> = docs
                .values()
                .filter(|doc| doc.user_id == user_id)
                .cloned()
                .collect();
            owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(owned)
        })
    }

    fn get_canvas(
        &self,
        token: &str,
        user_id: &str,
        canvas_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>> {
        let checked = self.check(token);
        let user_id = user_id.to_string();
        let canvas_id = canvas_id.to_string();
        Box::pin(async move {
            checked?;
            let not_found = || PersistenceError::NotFound("Canvas not found".into());
            let id = Uuid::parse_str(&canvas_id).map_err(|_| not_found())?;
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&id)
                .filter(|doc| doc.user_id == user_id)
                .cloned()
                .ok_or_else(not_found)
        })
    }
}
