//! Worker pipeline: the fixed stage sequence executed once per applicant.

use crate::llm_client::CompletionClient;
use crate::scoring::record::{ApplicantWorkingRecord, JobContext, WorkerOutput};
use crate::scoring::stages;
use crate::scoring::store::ApplicantStore;

/// Runs the four stages in order for exactly one applicant and returns its
/// single output. Infallible at this boundary: every stage absorbs its own
/// failures, so the pipeline always completes and always yields one result.
///
/// Order is fixed: retrieval → scoring/grading → categorization →
/// justification. No stage is skipped, even for an errored record.
pub async fn run_worker(
    applicant_id: i64,
    ctx: &JobContext,
    store: &dyn ApplicantStore,
    llm: &dyn CompletionClient,
) -> WorkerOutput {
    let record = ApplicantWorkingRecord::seed(applicant_id);
    let record = stages::retrieval(record, store).await;
    let record = stages::score_and_grade(record, ctx, llm).await;
    let record = stages::categorize(record, ctx, llm).await;
    stages::justify(record, ctx, llm).await
}
