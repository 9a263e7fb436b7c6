mod analysis;
mod config;
mod credentials;
mod errors;
mod extract;
mod interview;
mod layout;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

const REAPER_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));
    info!("Generative model: {}", llm_client::MODEL);
    info!(
        data_dir = %config.data_dir.display(),
        speech_capture = config.speech_capture_enabled,
        max_upload_bytes = config.max_upload_bytes,
        interview_idle_secs = config.interview_idle_timeout.as_secs(),
        analysis_ttl_secs = config.analysis_ttl.as_secs(),
        max_stored_analyses = config.max_stored_analyses,
        "Configuration loaded"
    );

    let state = AppState::new(&config).await?;
    let _interview_reaper = state.interviews.spawn_reaper(REAPER_INTERVAL);
    let _analysis_reaper = state.analyses.spawn_reaper(REAPER_INTERVAL);
    info!(
        "Layout page config: {}x{}pt, {}pt margins",
        state.page_config.page_width, state.page_config.page_height, state.page_config.margin
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
