//! schedmetrics exposition host.
//!
//! Loads `schedmetrics.yaml`, registers the scheduler catalogue, and serves
//! `/metrics` for an external collector. Any configuration-time failure
//! (bad config, duplicate or invalid instrument) stops the process.

use tracing_subscriber::{fmt, EnvFilter};

use schedmetrics_recorder::{app_state, config, router};

const CONFIG_PATH: &str = "schedmetrics.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, fatal = e.is_fatal(), "schedmetrics-recorder exiting");
        std::process::exit(1);
    }
}

async fn run() -> schedmetrics_core::Result<()> {
    let cfg = config::load_from_file(CONFIG_PATH)?;
    let listen = cfg.exporter.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "schedmetrics-recorder starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| schedmetrics_core::MetricsError::Internal(format!("bind failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| schedmetrics_core::MetricsError::Internal(format!("server failed: {e}")))
}
