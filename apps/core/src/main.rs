// Pathway Core entry point
// Loads configuration, starts the session supervisor and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use pathway_core::actors::{LlmActorHandle, ProfileExtractionDelegate, SessionSettings, SupervisorHandle};
use pathway_core::api::{self, AppState};
use pathway_core::brain::CounselorEngine;
use pathway_core::config::AppConfig;
use pathway_core::telemetry;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenv::dotenv();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    telemetry::init_tracing(config.log_format);

    let engine = Arc::new(CounselorEngine::default());

    let delegate: Option<Arc<dyn ProfileExtractionDelegate>> = match &config.delegate {
        Some(delegate_config) => {
            info!(
                "LLM extraction delegate enabled (model: {}, {} req/min)",
                delegate_config.model, delegate_config.requests_per_minute
            );
            Some(Arc::new(LlmActorHandle::new(delegate_config.clone())))
        }
        None => {
            warn!("GROQ_API_KEY not set, profile extraction is rule-based only");
            None
        }
    };

    let supervisor = SupervisorHandle::new(engine, delegate, SessionSettings::from(&config));
    let state = AppState { supervisor };

    api::serve(&config.bind_address(), state, shutdown_signal())
        .await
        .with_context(|| format!("Server failed on {}", config.bind_address()))?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
