//! Supervisor: fans out one worker task per applicant, reduces their
//! outputs into the aggregate, and runs the bulk persistence pass.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::llm_client::CompletionClient;
use crate::scoring::merge::AggregateRunState;
use crate::scoring::pipeline::run_worker;
use crate::scoring::record::{AnalysisOutcome, JobContext, WorkerOutput};
use crate::scoring::store::{persist_outcomes, ApplicantStore};

/// Summary of one finished run, returned to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub total_count: usize,
    /// Outcomes that were successfully written by the persistence pass.
    pub processed_count: usize,
    /// Worker-level errors plus persistence-level errors.
    pub error_count: u32,
    /// Always "completed" once every result has been attempted.
    pub status: String,
    pub results: Vec<AnalysisOutcome>,
}

/// Executes a full scoring run: dispatch, join, reduce, persist.
///
/// Workers are independent tasks sharing only the read-only `JobContext`
/// and the concurrency-safe store/LLM handles; one worker's failure can
/// never reach another's inputs or outputs. An empty applicant list skips
/// straight to (empty) persistence.
pub async fn run_scoring(
    ctx: Arc<JobContext>,
    applicant_ids: Vec<i64>,
    store: Arc<dyn ApplicantStore>,
    llm: Arc<dyn CompletionClient>,
) -> RunReport {
    info!(
        job_id = ctx.job_id,
        applicants = applicant_ids.len(),
        "starting scoring run"
    );

    // Fan-out: one task per applicant, each owning its working record.
    let handles: Vec<(i64, JoinHandle<WorkerOutput>)> = applicant_ids
        .iter()
        .map(|&applicant_id| {
            let ctx = Arc::clone(&ctx);
            let store = Arc::clone(&store);
            let llm = Arc::clone(&llm);
            let handle = tokio::spawn(async move {
                run_worker(applicant_id, &ctx, store.as_ref(), llm.as_ref()).await
            });
            (applicant_id, handle)
        })
        .collect();

    // Fan-in + reduce. Join order is arrival-agnostic; nothing downstream
    // may rely on result ordering.
    let mut state = AggregateRunState::start(applicant_ids);
    for (applicant_id, handle) in handles {
        let output = match handle.await {
            Ok(output) => output,
            Err(e) => {
                // A panicked worker still contributes a default outcome so
                // its applicant is not dropped from the run.
                warn!(applicant_id, error = %e, "worker task failed to join");
                WorkerOutput::defaulted(applicant_id)
            }
        };
        state.absorb(output);
    }

    let (persisted, persistence_errors) = persist_outcomes(store.as_ref(), &state.results).await;
    state.complete(persistence_errors);

    info!(
        job_id = ctx.job_id,
        results = state.results.len(),
        persisted,
        errors = state.error_count,
        "scoring run completed"
    );

    RunReport {
        total_count: state.applicant_ids.len(),
        processed_count: persisted,
        error_count: state.error_count,
        status: state.status,
        results: state.results,
    }
}
