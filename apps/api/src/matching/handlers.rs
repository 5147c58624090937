use axum::{
    extract::{Path, State},
    Json,
};

use crate::errors::AppError;
use crate::matching::skill_matcher::{match_skills, SkillMatchReport};
use crate::state::AppState;

/// GET /api/match-skills/:id
///
/// Rule-based recommendations from the taxonomy; no model call.
pub async fn handle_match_skills(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<SkillMatchReport>, AppError> {
    let employee = state
        .store
        .get_employee(&employee_id)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(Json(match_skills(employee, state.store.list_taxonomy())))
}
