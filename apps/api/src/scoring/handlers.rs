//! Axum route handlers for the Scoring API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::applicant::{ApplicantRow, ScoredApplicantRow};
use crate::scoring::service::{RunSummary, StatusReport};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ScoreRequest {
    /// Explicit applicant subset; omitted means all applicants for the job.
    pub applicant_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ScoredApplicantsResponse {
    pub job_id: i64,
    pub applicants: Vec<ScoredApplicantRow>,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

/// POST /api/v1/jobs/:job_id/score
///
/// Kicks off a full scoring run for the job. Rejects with 409 PROCESS_LOCKED
/// while another run holds the processing lock, 400/404 on bad requests.
/// Otherwise blocks until the run (including persistence) completes and
/// returns the summary.
pub async fn handle_initiate_scoring(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<RunSummary>, AppError> {
    let summary = state
        .scoring
        .initiate_scoring(job_id, request.applicant_ids)
        .await?;
    Ok(Json(summary))
}

/// GET /api/v1/jobs/:job_id/score/status
pub async fn handle_scoring_status(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<Json<StatusReport>, AppError> {
    let report = state.scoring.scoring_status(job_id).await?;
    Ok(Json(report))
}

/// GET /api/v1/jobs/:job_id/applicants
///
/// Scored applicants ordered by score descending, paginated.
pub async fn handle_scored_applicants(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ScoredApplicantsResponse>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let applicants = state
        .scoring
        .scored_applicants(job_id, limit, offset)
        .await?;

    Ok(Json(ScoredApplicantsResponse {
        job_id,
        count: applicants.len(),
        applicants,
        limit,
        offset,
    }))
}

/// GET /api/v1/applicants/:applicant_id
///
/// Full stored analysis for one applicant, including status fields and the
/// analysis timestamp.
pub async fn handle_applicant_detail(
    State(state): State<AppState>,
    Path(applicant_id): Path<i64>,
) -> Result<Json<ApplicantRow>, AppError> {
    let row = state.scoring.applicant_detail(applicant_id).await?;
    Ok(Json(row))
}
