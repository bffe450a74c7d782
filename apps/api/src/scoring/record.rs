//! Typed per-run and per-worker state. Stages pass an explicit
//! `ApplicantWorkingRecord` value through the pipeline; nothing is shared
//! mutably between workers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::applicant::{Categorization, QualityGrade};

/// Immutable job-side inputs shared by every worker in one run.
/// Owned by the supervisor behind an `Arc`; read-only to all workers.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: i64,
    /// Detailed requirements text every prompt scores against. May be empty
    /// if the listing has no detailed description.
    pub job_requirements: String,
    /// Free-form structured criteria (the listing's required skills).
    pub job_criteria: Value,
}

/// Working state for exactly one applicant, owned by that applicant's worker
/// for the duration of the run.
#[derive(Debug, Clone)]
pub struct ApplicantWorkingRecord {
    pub applicant_id: i64,
    /// Empty until retrieval; stays empty if retrieval fails.
    pub resume_text: String,
    pub overall_score: u8,
    pub quality_grade: QualityGrade,
    pub categorization: Categorization,
    pub justification: String,
    /// Failures absorbed by this worker's stages.
    pub error_count: u32,
}

impl ApplicantWorkingRecord {
    /// Seeds a fresh record with safe defaults. A record that never makes it
    /// through any stage still emits a valid (all-default) outcome.
    pub fn seed(applicant_id: i64) -> Self {
        Self {
            applicant_id,
            resume_text: String::new(),
            overall_score: 0,
            quality_grade: QualityGrade::F,
            categorization: Categorization::Mismatched,
            justification: String::new(),
            error_count: 0,
        }
    }

    pub fn mark_error(&mut self) {
        self.error_count += 1;
    }

    /// Converts the finished record into the outcome emitted to the
    /// aggregate. Always called exactly once per worker, by the
    /// justification stage.
    pub fn into_output(self) -> WorkerOutput {
        WorkerOutput {
            outcome: AnalysisOutcome {
                applicant_id: self.applicant_id,
                overall_score: self.overall_score,
                quality_grade: self.quality_grade,
                categorization: self.categorization,
                justification_summary: self.justification,
            },
            error_count: self.error_count,
        }
    }
}

/// The per-applicant analysis result appended to the aggregate result list
/// and written back to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub applicant_id: i64,
    pub overall_score: u8,
    pub quality_grade: QualityGrade,
    pub categorization: Categorization,
    pub justification_summary: String,
}

/// What one worker hands back to the supervisor: its single outcome plus the
/// failures it absorbed along the way.
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    pub outcome: AnalysisOutcome,
    pub error_count: u32,
}

impl WorkerOutput {
    /// Fallback output for a worker that never produced one (task panic).
    /// Keeps the one-result-per-applicant invariant intact.
    pub fn defaulted(applicant_id: i64) -> Self {
        let mut record = ApplicantWorkingRecord::seed(applicant_id);
        record.justification = format!("Analysis for applicant {applicant_id} did not complete.");
        record.mark_error();
        record.into_output()
    }
}
