//! Submission metrics.
//!
//! # Metrics
//! - `oracle_blocks_submitted_total` (counter): submissions by resolved status
//! - `oracle_submission_errors_total` (counter): failed submissions by error kind
//! - `oracle_confirmation_wait_seconds` (histogram): time spent waiting for execution

use std::time::Duration;

use crate::ledger::SubmissionStatus;

pub fn record_submission(status: &SubmissionStatus) {
    let label = match status {
        SubmissionStatus::Accepted => "accepted",
        SubmissionStatus::Confirmed => "confirmed",
        SubmissionStatus::Aborted { .. } => "aborted",
    };
    metrics::counter!("oracle_blocks_submitted_total", "status" => label).increment(1);
}

pub fn record_submission_error(kind: &'static str) {
    metrics::counter!("oracle_submission_errors_total", "kind" => kind).increment(1);
}

pub fn record_confirmation_wait(waited: Duration) {
    metrics::histogram!("oracle_confirmation_wait_seconds").record(waited.as_secs_f64());
}
