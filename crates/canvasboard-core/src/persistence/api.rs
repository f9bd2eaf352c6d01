//! Wire types shared by the storage API client and server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored canvas. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// Serialized scene, opaque to the server.
    pub canvas_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/canvas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCanvas {
    pub canvas_data: String,
    pub user_id: String,
    pub name: String,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// External identity id.
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/user/sign`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// `201` reply to a save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCanvasEnvelope {
    pub success: bool,
    pub message: String,
    pub canvas: CanvasDocument,
}

/// Reply to a list request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasListEnvelope {
    pub success: bool,
    pub canvases: Vec<CanvasDocument>,
}

/// Reply to a single-document fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasEnvelope {
    pub success: bool,
    pub canvas: CanvasDocument,
}

/// Reply to a sign-in sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: User,
}

/// Every non-2xx reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_uses_camel_case() {
        let body = NewCanvas {
            canvas_data: "{}".into(),
            user_id: "user_1".into(),
            name: "Sketch".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["canvasData"], "{}");
        assert_eq!(value["userId"], "user_1");
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = serde_json::to_value(ErrorEnvelope::new("User not found")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "success": false, "message": "User not found" })
        );
    }
}
