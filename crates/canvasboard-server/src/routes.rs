//! HTTP routes of the storage API.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use canvasboard_core::persistence::{
    CanvasEnvelope, CanvasListEnvelope, NewCanvas, SaveCanvasEnvelope, SignInRequest,
    UserEnvelope,
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Build the application router.
pub fn app(state: AppState, frontend_url: Option<&str>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/user/sign", post(sign_in))
        .route("/api/canvas", post(create_canvas))
        .route("/api/canvas/{user_id}", get(list_canvases))
        .route("/api/canvas/{user_id}/{canvas_id}", get(get_canvas))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_url))
        .with_state(state)
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let Some(origin) = frontend_url else {
        return CorsLayer::permissive();
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!("Ignoring invalid FRONTEND_URL {origin:?}, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Backend server is running" }))
}

async fn health() -> &'static str {
    "ok"
}

async fn sign_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SignInRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    auth.ensure_owner(&request.id)?;
    let user = state.store.upsert_user(request);
    tracing::info!(user_id = %user.id, "User signed in");
    Ok(Json(UserEnvelope {
        success: true,
        user,
    }))
}

async fn create_canvas(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(canvas): Json<NewCanvas>,
) -> Result<(StatusCode, Json<SaveCanvasEnvelope>), ApiError> {
    auth.ensure_owner(&canvas.user_id)?;
    let canvas = state.store.create_canvas(canvas)?;
    tracing::info!(canvas_id = %canvas.id, user_id = %canvas.user_id, "Canvas saved");
    Ok((
        StatusCode::CREATED,
        Json(SaveCanvasEnvelope {
            success: true,
            message: "Canvas saved successfully".into(),
            canvas,
        }),
    ))
}

async fn list_canvases(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<CanvasListEnvelope>, ApiError> {
    auth.ensure_owner(&user_id)?;
    let canvases = state.store.list_canvases(&user_id)?;
    Ok(Json(CanvasListEnvelope {
        success: true,
        canvases,
    }))
}

async fn get_canvas(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, canvas_id)): Path<(String, String)>,
) -> Result<Json<CanvasEnvelope>, ApiError> {
    auth.ensure_owner(&user_id)?;
    let canvas_id = Uuid::parse_str(&canvas_id)
        .map_err(|_| ApiError::NotFound("Canvas not found".into()))?;
    let canvas = state.store.get_canvas(&user_id, canvas_id)?;
    Ok(Json(CanvasEnvelope {
        success: true,
        canvas,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenVerifier;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let verifier = StaticTokenVerifier::default()
            .with_token("alice-token", "alice")
            .with_token("bob-token", "bob")
            .with_token("ghost-token", "ghost");
        app(AppState::new(verifier), None)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn sign(app: &Router, user: &str) {
        let (status, _) = send(
            app,
            request(
                "POST",
                "/api/user/sign",
                Some(&format!("{user}-token")),
                Some(json!({ "id": user, "name": user, "email": format!("{user}@example.com") })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn save(app: &Router, user: &str, name: &str) -> (StatusCode, Value) {
        send(
            app,
            request(
                "POST",
                "/api/canvas",
                Some(&format!("{user}-token")),
                Some(json!({ "canvasData": "{\"version\":1}", "userId": user, "name": name })),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_index_and_health() {
        let app = test_app();
        let (status, body) = send(&app, request("GET", "/", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Backend server is running");

        let response = app.oneshot(request("GET", "/health", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let app = test_app();
        let (status, body) = send(&app, request("GET", "/api/canvas/alice", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) =
            send(&app, request("GET", "/api/canvas/alice", Some("nope"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_save_unknown_user_is_not_found() {
        let app = test_app();
        let (status, body) = save(&app, "ghost", "Sketch").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_not_found() {
        let app = test_app();
        let (status, body) =
            send(&app, request("GET", "/api/canvas/ghost", Some("ghost-token"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "User not found" }));
    }

    #[tokio::test]
    async fn test_save_list_and_get() {
        let app = test_app();
        sign(&app, "alice").await;

        let (status, body) = save(&app, "alice", "Sketch").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["canvas"]["name"], "Sketch");
        let id = body["canvas"]["id"].as_str().unwrap().to_string();

        let (status, body) =
            send(&app, request("GET", "/api/canvas/alice", Some("alice-token"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canvases"].as_array().unwrap().len(), 1);

        let uri = format!("/api/canvas/alice/{id}");
        let (status, body) = send(&app, request("GET", &uri, Some("alice-token"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["canvas"]["canvasData"], "{\"version\":1}");
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let app = test_app();
        sign(&app, "alice").await;
        let (status, body) = save(&app, "alice", "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Canvas name is required");
    }

    #[tokio::test]
    async fn test_other_users_records_are_forbidden() {
        let app = test_app();
        sign(&app, "alice").await;
        sign(&app, "bob").await;
        let (_, body) = save(&app, "alice", "Private").await;
        let id = body["canvas"]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/canvas/alice/{id}");
        let (status, _) = send(&app, request("GET", &uri, Some("bob-token"), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let uri = format!("/api/canvas/bob/{id}");
        let (status, body) = send(&app, request("GET", &uri, Some("bob-token"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Canvas not found");
    }

    #[tokio::test]
    async fn test_malformed_canvas_id_is_not_found() {
        let app = test_app();
        sign(&app, "alice").await;
        let (status, _) = send(
            &app,
            request("GET", "/api/canvas/alice/not-a-uuid", Some("alice-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
