mod analysis;
mod config;
mod dataset;
mod directory;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::planner::PlanSettings;
use crate::config::Config;
use crate::dataset::DatasetStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Load datasets; a missing or malformed file aborts startup
    let store = DatasetStore::load(&config.employees_path, &config.taxonomy_path)?;

    // Initialize LLM client (credentials are checked on first use)
    let llm = LlmClient::new(config.llm.clone())?;
    info!("LLM client initialized (model: {})", llm.model());
    if config.llm.base_url.is_none() || config.llm.effective_key().is_none() {
        warn!("LLM endpoint or key not configured; /api/analyze will fail until they are set");
    }

    let plan_settings = PlanSettings {
        reference_year: config.tenure_reference_year,
        field_policy: config.field_policy,
    };
    info!(
        "Plan settings: tenure reference year {}, field policy {:?}",
        plan_settings.reference_year, plan_settings.field_policy
    );

    // Build app state
    let state = AppState {
        store: Arc::new(store),
        llm: Arc::new(llm),
        plan_settings,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
