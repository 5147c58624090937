use std::sync::Arc;

use crate::analysis::planner::PlanSettings;
use crate::dataset::DatasetStore;
use crate::llm_client::CompletionProvider;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything here is read-only after startup, so handlers never lock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    /// Pluggable model backend. Production: `LlmClient`; tests swap in a stub.
    pub llm: Arc<dyn CompletionProvider>,
    pub plan_settings: PlanSettings,
}
