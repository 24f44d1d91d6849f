use anyhow::{Context, Result};
use axum::Router;
use kingchat_core::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::routes(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    tracing::info!(
        "Using Ollama at {} (models: {})",
        config.ollama.base_url,
        config.ollama.models.join(", ")
    );
    let state = Arc::new(AppState::with_ollama(config)?);
    let app = router(state);

    tracing::info!("Starting chat server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Chat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
