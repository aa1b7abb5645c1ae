//! rolechat HTTP server binary.
//!
//! Starts an axum HTTP server exposing the persona chat endpoints.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY` - provider credential (required; startup fails without it)
//! - `PORT` - HTTP port (default: 8080)
//! - `ROLECHAT_PERSONA_FILE` - YAML persona file (default: builtin personas)
//! - `RUST_LOG` - Tracing filter (default: "info,rolechat=debug")
//!
//! See [`rolechat::config`] for the full list.
//!
//! # Usage
//!
//! ```bash
//! ANTHROPIC_API_KEY=sk-... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use rolechat::config::AppConfig;
use rolechat::llms::AnthropicCompletion;
use rolechat::persona::PersonaCatalog;
use rolechat::server::{app_router, AppState};
use rolechat::ResponsePipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rolechat=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let catalog = match &config.persona_file {
        Some(path) => PersonaCatalog::from_file(path)
            .with_context(|| format!("failed to load personas from {}", path.display()))?,
        None => PersonaCatalog::builtin(),
    };
    tracing::info!("Loaded {} personas", catalog.registry.len());

    let provider = AnthropicCompletion::new(
        config.anthropic_api_key.clone(),
        config.anthropic_base_url.clone(),
        config.request_timeout,
    )
    .context("failed to build Anthropic client")?
    .with_max_retries(config.max_retries);

    let pipeline = ResponsePipeline::new(catalog, Arc::new(provider), config.generation.clone())
        .with_history_window(config.history_window);
    let app = app_router(AppState::new(pipeline));

    let bind_addr = config.bind_addr();
    tracing::info!("rolechat server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             - liveness probe");
    tracing::info!("  POST /api/chat           - persona chat turn");
    tracing::info!("  GET  /api/characters     - persona catalog");
    tracing::info!("  GET  /api/characters/:id - one persona");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("rolechat server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
