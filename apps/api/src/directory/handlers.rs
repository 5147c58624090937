use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::employee::EmployeeSummary;
use crate::models::taxonomy::TaxonomyEntry;
use crate::state::AppState;

/// GET /api/employees
pub async fn handle_list_employees(State(state): State<AppState>) -> Json<Vec<EmployeeSummary>> {
    Json(state.store.summaries())
}

/// GET /api/employee/:id
///
/// Returns the record exactly as stored in the dataset file.
pub async fn handle_get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .get_employee_record(&employee_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

/// GET /api/skills-taxonomy
pub async fn handle_skills_taxonomy(State(state): State<AppState>) -> Json<Vec<TaxonomyEntry>> {
    Json(state.store.list_taxonomy().to_vec())
}
