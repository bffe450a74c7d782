pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scoring::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring API
        .route(
            "/api/v1/jobs/:job_id/score",
            post(handlers::handle_initiate_scoring),
        )
        .route(
            "/api/v1/jobs/:job_id/score/status",
            get(handlers::handle_scoring_status),
        )
        .route(
            "/api/v1/jobs/:job_id/applicants",
            get(handlers::handle_scored_applicants),
        )
        .route(
            "/api/v1/applicants/:applicant_id",
            get(handlers::handle_applicant_detail),
        )
        .with_state(state)
}
