pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::directory::handlers;
use crate::matching::handlers::handle_match_skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/test", get(health::health_handler))
        // Dataset views
        .route("/api/employees", get(handlers::handle_list_employees))
        .route("/api/employee/:id", get(handlers::handle_get_employee))
        .route("/api/skills-taxonomy", get(handlers::handle_skills_taxonomy))
        // Recommendations
        .route("/api/match-skills/:id", get(handle_match_skills))
        .route("/api/analyze", post(handle_analyze))
        .with_state(state)
}
