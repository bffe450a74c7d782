//! Run orchestration around the supervisor: request validation, admission
//! control over the processing-status advisory lock, stale-lock reclamation,
//! and the status/report read paths.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::CompletionClient;
use crate::models::applicant::{ApplicantRow, ProcessingApplicant, ScoredApplicantRow};
use crate::models::job::JobRow;
use crate::scoring::record::{AnalysisOutcome, JobContext};
use crate::scoring::store::{AdmissionStore, ApplicantStore, PgApplicantStore};
use crate::scoring::supervisor::run_scoring;

/// What the caller gets back from a completed run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub job_id: i64,
    pub applicant_count: usize,
    pub processed_count: usize,
    pub error_count: u32,
    pub status: String,
    pub results: Vec<AnalysisOutcome>,
}

/// Per-job processing status counts and the derived overall status.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub job_id: i64,
    pub status: String,
    pub total_applicants: i64,
    pub completed_count: i64,
    pub processing_count: i64,
    pub error_count: i64,
    pub message: String,
}

#[derive(Clone)]
pub struct ScoringService {
    pool: PgPool,
    store: Arc<PgApplicantStore>,
    llm: Arc<dyn CompletionClient>,
    stale_processing_secs: i64,
}

impl ScoringService {
    pub fn new(pool: PgPool, llm: Arc<dyn CompletionClient>, stale_processing_secs: i64) -> Self {
        Self {
            store: Arc::new(PgApplicantStore::new(pool.clone())),
            pool,
            llm,
            stale_processing_secs,
        }
    }

    /// Validates the request, takes the advisory lock, and executes the full
    /// map-reduce run. All rejections happen before any worker is dispatched;
    /// once dispatch starts the run always completes with a summary.
    pub async fn initiate_scoring(
        &self,
        job_id: i64,
        applicant_ids: Option<Vec<i64>>,
    ) -> Result<RunSummary, AppError> {
        if job_id <= 0 {
            return Err(AppError::Validation("Invalid job_id provided".to_string()));
        }
        if let Some(ids) = &applicant_ids {
            if ids.iter().any(|&id| id <= 0) {
                return Err(AppError::Validation(
                    "All applicant IDs must be positive integers".to_string(),
                ));
            }
        }

        let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job listing {job_id} does not exist")))?;

        let selected = self.resolve_applicants(job_id, applicant_ids).await?;

        admit_run(self.store.as_ref(), job_id, self.stale_processing_secs).await?;
        self.store
            .claim(&selected, Utc::now())
            .await
            .map_err(AppError::Internal)?;

        let ctx = Arc::new(JobContext {
            job_id,
            job_requirements: job.detailed_description.unwrap_or_default(),
            job_criteria: job.required_skills,
        });

        let report = run_scoring(
            ctx,
            selected,
            self.store.clone() as Arc<dyn ApplicantStore>,
            Arc::clone(&self.llm),
        )
        .await;

        Ok(RunSummary {
            job_id,
            applicant_count: report.total_count,
            processed_count: report.processed_count,
            error_count: report.error_count,
            status: report.status,
            results: report.results,
        })
    }

    /// Resolves the applicant set for the run: the explicit subset (every id
    /// must belong to the job) or all of the job's applicants. An empty set
    /// after filtering is a rejection, not an empty run.
    async fn resolve_applicants(
        &self,
        job_id: i64,
        applicant_ids: Option<Vec<i64>>,
    ) -> Result<Vec<i64>, AppError> {
        let found: Vec<i64> = match &applicant_ids {
            Some(ids) => {
                sqlx::query_scalar("SELECT id FROM applicants WHERE job_id = $1 AND id = ANY($2)")
                    .bind(job_id)
                    .bind(ids)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => sqlx::query_scalar("SELECT id FROM applicants WHERE job_id = $1")
                .bind(job_id)
                .fetch_all(&self.pool)
                .await?,
        };

        if let Some(requested) = applicant_ids {
            let found_set: BTreeSet<i64> = found.iter().copied().collect();
            let missing: Vec<i64> = requested
                .into_iter()
                .collect::<BTreeSet<i64>>()
                .difference(&found_set)
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(AppError::Validation(format!(
                    "Applicants with IDs {missing:?} not found for job {job_id}"
                )));
            }
        }

        if found.is_empty() {
            return Err(AppError::Validation(
                "No applicants found for the specified job listing".to_string(),
            ));
        }
        Ok(found)
    }

    /// Status query: counts per processing status plus the derived overall
    /// run status for the job.
    pub async fn scoring_status(&self, job_id: i64) -> Result<StatusReport, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job listing {job_id} does not exist")))?;

        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT processing_status, COUNT(*) FROM applicants
             WHERE job_id = $1 GROUP BY processing_status",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        let count_for = |status: &str| {
            counts
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };
        let total: i64 = counts.iter().map(|(_, n)| n).sum();
        let completed = count_for("completed");
        let processing = count_for("processing");
        let errored = count_for("error");

        let status = derive_overall_status(total, completed, processing, errored);

        Ok(StatusReport {
            job_id,
            status: status.to_string(),
            total_applicants: total,
            completed_count: completed,
            processing_count: processing,
            error_count: errored,
            message: format!("Processing {completed} of {total} applicants"),
        })
    }

    /// Scored applicants for a job, highest score first.
    pub async fn scored_applicants(
        &self,
        job_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ScoredApplicantRow>, AppError> {
        let rows = sqlx::query_as::<_, ScoredApplicantRow>(
            "SELECT id, applicant_name, overall_score, quality_grade, categorization,
                    justification_summary, processing_status, upload_date
             FROM applicants
             WHERE job_id = $1
             ORDER BY overall_score DESC NULLS LAST, id
             LIMIT $2 OFFSET $3",
        )
        .bind(job_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Full stored analysis for one applicant.
    pub async fn applicant_detail(&self, applicant_id: i64) -> Result<ApplicantRow, AppError> {
        sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE id = $1")
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Applicant {applicant_id} not found")))
    }
}

/// Admission control: reclaims stale processing locks, then rejects if any
/// live lock remains. The lock is advisory via processing_status, not a
/// database transaction lock.
async fn admit_run(
    store: &dyn AdmissionStore,
    job_id: i64,
    stale_processing_secs: i64,
) -> Result<(), AppError> {
    let cutoff = Utc::now() - Duration::seconds(stale_processing_secs);

    let reclaimed = store
        .reclaim_stale(job_id, cutoff)
        .await
        .map_err(AppError::Internal)?;
    if reclaimed > 0 {
        info!(job_id, reclaimed, "reclaimed stale processing locks");
    }

    let processing: Vec<ProcessingApplicant> = store
        .list_processing(job_id)
        .await
        .map_err(AppError::Internal)?;
    if !processing.is_empty() {
        return Err(AppError::ProcessLocked(processing));
    }
    Ok(())
}

/// Derived overall status for a job's applicant set.
/// Order matters: empty set first, then full completion, then any live
/// processing, then errors, then pending.
fn derive_overall_status(total: i64, completed: i64, processing: i64, errored: i64) -> &'static str {
    if total == 0 {
        "no_applicants"
    } else if completed == total {
        "completed"
    } else if processing > 0 {
        "processing"
    } else if errored > 0 {
        "error"
    } else {
        "pending"
    }
}
