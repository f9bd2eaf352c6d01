//! Concurrent in-memory store for users and canvas documents.

use canvasboard_core::persistence::{CanvasDocument, NewCanvas, SignInRequest, User};
use chrono::Utc;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("User not found")]
    UserNotFound,
    #[error("Canvas not found")]
    CanvasNotFound,
    #[error("Canvas name is required")]
    InvalidName,
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Default)]
pub struct Store {
    users: DashMap<String, User>,
    canvases: DashMap<Uuid, CanvasDocument>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or refresh a user record. The creation time survives updates.
    pub fn upsert_user(&self, request: SignInRequest) -> User {
        let mut entry = self.users.entry(request.id.clone()).or_insert_with(|| User {
            id: request.id.clone(),
            name: String::new(),
            email: String::new(),
            image_url: None,
            created_at: Utc::now(),
        });
        entry.name = request.name;
        entry.email = request.email;
        entry.image_url = request.image_url;
        entry.clone()
    }

    pub fn user_exists(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn create_canvas(&self, canvas: NewCanvas) -> StoreResult<CanvasDocument> {
        if canvas.name.trim().is_empty() {
            return Err(StoreError::InvalidName);
        }
        if !self.user_exists(&canvas.user_id) {
            return Err(StoreError::UserNotFound);
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
        self.canvases.insert(document.id, document.clone());
        Ok(document)
    }

    /// A user's documents, newest first.
    pub fn list_canvases(&self, user_id: &str) -> StoreResult<Vec<CanvasDocument>> {
        if !self.user_exists(user_id) {
            return Err(StoreError::UserNotFound);
        }
        let mut owned: Vec<_> = self
            .canvases
            .iter()
            .filter(|doc| doc.user_id == user_id)
            .map(|doc| doc.value().clone())
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    /// One document, only if `user_id` owns it.
    pub fn get_canvas(&self, user_id: &str, canvas_id: Uuid) -> StoreResult<CanvasDocument> {
        self.canvases
            .get(&canvas_id)
            .filter(|doc| doc.user_id == user_id)
            .map(|doc| doc.value().clone())
            .ok_or(StoreError::CanvasNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(store: &Store, id: &str) -> User {
        store.upsert_user(SignInRequest {
            id: id.into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            image_url: None,
        })
    }

    fn canvas(user: &str, name: &str) -> NewCanvas {
        NewCanvas {
            canvas_data: "{}".into(),
            user_id: user.into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_upsert_keeps_created_at() {
        let store = Store::new();
        let first = sign(&store, "u1");
        let again = store.upsert_user(SignInRequest {
            id: "u1".into(),
            name: "Ada L.".into(),
            email: "ada@example.com".into(),
            image_url: Some("https://img".into()),
        });
        assert_eq!(first.created_at, again.created_at);
        assert_eq!(again.name, "Ada L.");
    }

    #[test]
    fn test_create_requires_user_and_name() {
        let store = Store::new();
        assert_eq!(store.create_canvas(canvas("u1", "x")), Err(StoreError::UserNotFound));
        sign(&store, "u1");
        assert_eq!(store.create_canvas(canvas("u1", "  ")), Err(StoreError::InvalidName));
        assert!(store.create_canvas(canvas("u1", "x")).is_ok());
    }

    #[test]
    fn test_get_checks_owner() {
        let store = Store::new();
        sign(&store, "u1");
        sign(&store, "u2");
        let doc = store.create_canvas(canvas("u1", "mine")).unwrap();
        assert_eq!(store.get_canvas("u1", doc.id).unwrap(), doc);
        assert_eq!(store.get_canvas("u2", doc.id), Err(StoreError::CanvasNotFound));
    }

    #[test]
    fn test_list_newest_first() {
        let store = Store::new();
        sign(&store, "u1");
        let a = store.create_canvas(canvas("u1", "a")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = store.create_canvas(canvas("u1", "b")).unwrap();
        let ids: Vec<_> = store.list_canvases("u1").unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }
}
