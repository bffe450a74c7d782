//! Aggregate run state and the merge policy for reducing worker outputs.
//!
//! One documented rule per field, applied as a pure reduction after workers
//! complete:
//! - result list: concatenation, one entry per worker, order not significant
//! - error count: summed
//! - status: last-writer-wins, but an empty status never overwrites a set one
//! - applicant id list and job inputs: fixed at run start, never merged

use crate::scoring::record::{AnalysisOutcome, WorkerOutput};

pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_COMPLETED: &str = "completed";

/// Supervisor-owned aggregate for one run. Workers never touch this; the
/// supervisor folds their outputs in through [`AggregateRunState::absorb`].
#[derive(Debug)]
pub struct AggregateRunState {
    /// Fixed at run start; never mutated afterwards.
    pub applicant_ids: Vec<i64>,
    /// Append-only; one outcome per worker.
    pub results: Vec<AnalysisOutcome>,
    /// Worker errors plus, after the persistence pass, persistence errors.
    pub error_count: u32,
    /// processing | completed
    pub status: String,
}

impl AggregateRunState {
    pub fn start(applicant_ids: Vec<i64>) -> Self {
        Self {
            results: Vec::with_capacity(applicant_ids.len()),
            applicant_ids,
            error_count: 0,
            status: STATUS_PROCESSING.to_string(),
        }
    }

    /// Folds one worker's output into the aggregate.
    pub fn absorb(&mut self, output: WorkerOutput) {
        self.results.push(output.outcome);
        self.error_count += output.error_count;
    }

    /// Applies the persistence pass tally and moves the run to completed.
    pub fn complete(&mut self, persistence_errors: u32) {
        self.error_count += persistence_errors;
        merge_status(&mut self.status, STATUS_COMPLETED);
    }
}

/// Status merge rule: incoming wins unless it is empty.
pub fn merge_status(current: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *current = incoming.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::applicant::{Categorization, QualityGrade};
    use crate::scoring::record::WorkerOutput;

    fn output(applicant_id: i64, errors: u32) -> WorkerOutput {
        WorkerOutput {
            outcome: AnalysisOutcome {
                applicant_id,
                overall_score: 50,
                quality_grade: QualityGrade::C,
                categorization: Categorization::MidLevel,
                justification_summary: "ok".to_string(),
            },
            error_count: errors,
        }
    }

    #[test]
    fn test_absorb_concatenates_results_and_sums_errors() {
        let mut state = AggregateRunState::start(vec![1, 2, 3]);
        state.absorb(output(2, 1));
        state.absorb(output(1, 0));
        state.absorb(output(3, 2));

        assert_eq!(state.results.len(), 3);
        assert_eq!(state.error_count, 3);
        // Input list untouched by merging.
        assert_eq!(state.applicant_ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_one_result_per_worker_regardless_of_arrival_order() {
        let mut state = AggregateRunState::start(vec![5, 6]);
        state.absorb(output(6, 0));
        state.absorb(output(5, 0));

        let mut ids: Vec<i64> = state.results.iter().map(|o| o.applicant_id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![5, 6]);
    }

    #[test]
    fn test_complete_adds_persistence_errors_and_sets_status() {
        let mut state = AggregateRunState::start(vec![1]);
        state.absorb(output(1, 1));
        state.complete(2);

        assert_eq!(state.error_count, 3);
        assert_eq!(state.status, STATUS_COMPLETED);
    }

    #[test]
    fn test_merge_status_last_writer_wins() {
        let mut status = STATUS_PROCESSING.to_string();
        merge_status(&mut status, STATUS_COMPLETED);
        assert_eq!(status, STATUS_COMPLETED);
    }

    #[test]
    fn test_merge_status_empty_never_overwrites() {
        let mut status = STATUS_PROCESSING.to_string();
        merge_status(&mut status, "");
        assert_eq!(status, STATUS_PROCESSING);
    }

    #[test]
    fn test_empty_run_completes_with_zero_errors() {
        let mut state = AggregateRunState::start(vec![]);
        state.complete(0);
        assert!(state.results.is_empty());
        assert_eq!(state.error_count, 0);
        assert_eq!(state.status, STATUS_COMPLETED);
    }
}
