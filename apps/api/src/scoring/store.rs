//! Applicant store access for the pipeline: resume reads for the retrieval
//! stage and the bulk persistence pass. Behind a trait so pipeline tests run
//! against an in-memory stub.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::applicant::ProcessingApplicant;
use crate::scoring::record::AnalysisOutcome;

#[async_trait]
pub trait ApplicantStore: Send + Sync {
    /// Reads the parsed resume text for one applicant. Errors if the
    /// applicant does not exist or the store is unreachable; a missing text
    /// on an existing applicant is an empty string, not an error.
    async fn fetch_resume_text(&self, applicant_id: i64) -> Result<String>;

    /// Writes one finished outcome back to the applicant row, marking it
    /// completed/analyzed and stamping the analysis time. Errors if the row
    /// vanished or the write failed.
    async fn persist_outcome(&self, outcome: &AnalysisOutcome) -> Result<()>;
}

/// Advisory-lock operations over the processing-status column, used by
/// admission control before a run is dispatched. Separate from
/// [`ApplicantStore`] so the per-worker surface stays minimal.
#[async_trait]
pub trait AdmissionStore: Send + Sync {
    /// Resets 'processing' rows whose claim predates `cutoff` back to
    /// pending, clearing the claim timestamp. Returns the reclaimed count.
    async fn reclaim_stale(&self, job_id: i64, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Applicants currently holding the processing lock for the job.
    async fn list_processing(&self, job_id: i64) -> Result<Vec<ProcessingApplicant>>;

    /// Claims the selected applicants for a run. The claim timestamp is what
    /// a later run measures staleness against.
    async fn claim(&self, applicant_ids: &[i64], claimed_at: DateTime<Utc>) -> Result<()>;
}

/// Production store over the Postgres pool.
#[derive(Clone)]
pub struct PgApplicantStore {
    pool: PgPool,
}

impl PgApplicantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicantStore for PgApplicantStore {
    async fn fetch_resume_text(&self, applicant_id: i64) -> Result<String> {
        let text: Option<Option<String>> =
            sqlx::query_scalar("SELECT parsed_resume_text FROM applicants WHERE id = $1")
                .bind(applicant_id)
                .fetch_optional(&self.pool)
                .await?;

        match text {
            Some(text) => Ok(text.unwrap_or_default()),
            None => Err(anyhow!("Applicant {applicant_id} not found")),
        }
    }

    async fn persist_outcome(&self, outcome: &AnalysisOutcome) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE applicants
             SET overall_score = $2,
                 quality_grade = $3,
                 categorization = $4,
                 justification_summary = $5,
                 processing_status = 'completed',
                 analysis_status = 'analyzed',
                 analysis_timestamp = $6
             WHERE id = $1",
        )
        .bind(outcome.applicant_id)
        .bind(outcome.overall_score as i32)
        .bind(outcome.quality_grade.as_str())
        .bind(outcome.categorization.as_str())
        .bind(&outcome.justification_summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(anyhow!(
                "Applicant {} not found at persistence time",
                outcome.applicant_id
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AdmissionStore for PgApplicantStore {
    async fn reclaim_stale(&self, job_id: i64, cutoff: DateTime<Utc>) -> Result<u64> {
        let reclaimed = sqlx::query(
            "UPDATE applicants
             SET processing_status = 'pending', analysis_timestamp = NULL
             WHERE job_id = $1
               AND processing_status = 'processing'
               AND COALESCE(analysis_timestamp, upload_date) < $2",
        )
        .bind(job_id)
        .bind(cutoff)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(reclaimed)
    }

    async fn list_processing(&self, job_id: i64) -> Result<Vec<ProcessingApplicant>> {
        let processing = sqlx::query_as(
            "SELECT id, applicant_name FROM applicants
             WHERE job_id = $1 AND processing_status = 'processing'",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(processing)
    }

    async fn claim(&self, applicant_ids: &[i64], claimed_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE applicants
             SET processing_status = 'processing', analysis_timestamp = $2
             WHERE id = ANY($1)",
        )
        .bind(applicant_ids)
        .bind(claimed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Bulk persistence pass: one independent write per outcome. A failed item
/// increments the error tally and the batch moves on; there is no rollback
/// and no abort-on-first-error. Returns (persisted count, error count).
pub async fn persist_outcomes(
    store: &dyn ApplicantStore,
    outcomes: &[AnalysisOutcome],
) -> (usize, u32) {
    let mut persisted = 0usize;
    let mut errors = 0u32;

    for outcome in outcomes {
        match store.persist_outcome(outcome).await {
            Ok(()) => {
                info!(
                    applicant_id = outcome.applicant_id,
                    score = outcome.overall_score,
                    grade = outcome.quality_grade.as_str(),
                    "persisted analysis result"
                );
                persisted += 1;
            }
            Err(e) => {
                warn!(
                    applicant_id = outcome.applicant_id,
                    error = %e,
                    "failed to persist analysis result"
                );
                errors += 1;
            }
        }
    }

    (persisted, errors)
}
