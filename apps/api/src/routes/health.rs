use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api/health (also served at /api/test)
/// Liveness plus dataset counts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "Backend is running!",
        "total_employees": state.store.list_employees().len(),
        "total_skills": state.store.list_taxonomy().len(),
    }))
}
