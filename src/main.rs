mod config;
mod http;
mod llm;
mod models;
mod search;
mod state;
mod talent;

use crate::config::ApiConfig;
use crate::llm::LlmClient;
use crate::state::AppState;
use crate::talent::TalentClient;
use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::load().context("Failed to load configuration")?;

    let talent_client = TalentClient::new(
        &config.talent.base_url,
        &config.talent.api_key,
        config.talent.request_timeout(),
    )
    .context("Failed to initialize identity source client")?;

    let llm_client = LlmClient::new(
        &config.llm.endpoint,
        &config.llm.api_key,
        &config.llm.model,
        config.llm.temperature,
        config.llm.request_timeout(),
    )
    .context("Failed to initialize LLM client")?;

    let app_state = AppState::new(
        talent_client,
        llm_client,
        config.search.clone(),
        config.talent.page_size,
    );

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("findabuilder API listening on {local_addr}");

    let router: Router = http::router(app_state);
    let server = axum::serve(listener, router.into_make_service());
    server
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    Ok(())
}

fn init_tracing() {
    let default_filter = "info";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    assert!(!filter.is_empty(), "Tracing filter must not be empty");
    assert!(filter.len() < 256, "Tracing filter length exceeds bounds");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
