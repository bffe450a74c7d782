use sqlx::PgPool;

use crate::scoring::service::ScoringService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pool handle reserved for the job/applicant CRUD surfaces that sit
    /// outside the scoring engine. The scoring service carries its own clone.
    #[allow(dead_code)]
    pub db: PgPool,
    pub scoring: ScoringService,
}
