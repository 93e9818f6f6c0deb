//! vibe-proxy: serves `POST /api/generate` with a server-held Gemini key.
//!
//! Reads `~/.vibe/config.toml` (`[server] bind`, `[gemini]`), and the key from
//! `API_KEY` / `GEMINI_API_KEY` or `[api_keys] google`.

use anyhow::Context;
use tokio::net::TcpListener;

use vibe_config::VibeConfig;
use vibe_server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vibe_server=debug".into()),
        )
        .init();

    let config = VibeConfig::load()
        .context("failed to load config")?
        .unwrap_or_default();
    let state = AppState::from_config(&config);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        model = %config.gemini.model,
        credential = state.has_credential(),
        "vibe-proxy listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
