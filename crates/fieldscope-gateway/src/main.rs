//! Gateway binary entry point.
//!
//! Loads `fieldscope.yaml` (falling back to defaults when absent),
//! initializes structured logging, and serves the gateway router.

use std::path::Path;
use std::sync::Arc;

use fieldscope_core::AppConfig;
use fieldscope_gateway::router::build_router;
use fieldscope_gateway::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Configuration file path.
const CONFIG_PATH: &str = "fieldscope.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = if Path::new(CONFIG_PATH).exists() {
        AppConfig::load(Path::new(CONFIG_PATH))?
    } else {
        AppConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone())),
        )
        .with_target(true)
        .init();

    info!("fieldscope-gateway starting");

    let state = Arc::new(AppState::new(&config.gateway));
    let router = build_router(state);

    let listener = TcpListener::bind(&config.gateway.bind_addr).await?;
    info!(addr = %config.gateway.bind_addr, "gateway listening");
    axum::serve(listener, router).await?;
    Ok(())
}
