//! Canvasboard storage server.
//!
//! Stores users and named canvas documents behind a small JSON API. Every
//! `/api` route needs a bearer token, and callers only see their own records.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AuthUser, StaticTokenVerifier, TokenVerifier};
pub use config::ServerConfig;
pub use routes::app;
pub use state::AppState;
