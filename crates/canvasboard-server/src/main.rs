//! Canvasboard storage server binary.
//!
//! Run with: cargo run --bin canvasboard-server

use canvasboard_server::{AppState, ServerConfig, StaticTokenVerifier, app};
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvasboard_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    if config.auth_tokens.is_empty() {
        tracing::warn!("AUTH_TOKENS is empty, every /api request will be rejected");
    }

    let state = AppState::new(StaticTokenVerifier::new(config.auth_tokens.clone()));
    let app = app(state, config.frontend_url.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Canvasboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
