//! Axum route handler for the career analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::analysis::planner::{generate_career_plan, AnalyzeRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze
///
/// Builds a prompt for the employee (optionally aimed at `target_role`),
/// calls the model, and returns the parsed career plan JSON. An absent or
/// empty `employee_id` is looked up like any other and ends in 404.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;

    let plan = generate_career_plan(
        &state.store,
        state.llm.as_ref(),
        state.plan_settings,
        &request,
    )
    .await?;

    Ok(Json(plan))
}
