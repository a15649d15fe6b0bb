//! Surfacing submission results to the operator.

use crate::ledger::{SubmissionResult, SubmissionStatus};

/// Log a result. Aborts are logged at `warn` so they never blend in with confirmations.
pub fn report(result: &SubmissionResult) {
    let digest = result.digest();
    let effects = result.effects().map(<[_]>::len);
    let object_changes = result.object_changes().map(<[_]>::len);

    match result.status() {
        SubmissionStatus::Accepted => {
            tracing::info!(%digest, "Block accepted; execution not awaited");
        }
        SubmissionStatus::Confirmed => {
            tracing::info!(
                %digest,
                gas_used = ?result.gas_used(),
                ?effects,
                ?object_changes,
                "Block confirmed"
            );
        }
        SubmissionStatus::Aborted { reason } => {
            let failed_step = result
                .effects()
                .and_then(|effects| effects.iter().find(|e| !e.status.is_success()))
                .map(|e| e.target.to_string());
            tracing::warn!(
                %digest,
                %reason,
                ?failed_step,
                gas_used = ?result.gas_used(),
                "Block aborted during execution"
            );
        }
    }
}

/// Pretty JSON for stdout.
pub fn render(result: &SubmissionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        BlockDigest, ExecutionOutcome, ExecutionStatus, ResponseOptions, StepEffect,
    };
    use alloy::primitives::B256;

    fn aborted() -> SubmissionResult {
        let outcome = ExecutionOutcome {
            digest: BlockDigest(B256::repeat_byte(1)),
            status: ExecutionStatus::Failure {
                error: "MoveAbort: stale price".into(),
            },
            effects: vec![StepEffect {
                step: 0,
                target: "0x1::oracle::authorize".parse().unwrap(),
                status: ExecutionStatus::Failure {
                    error: "MoveAbort: stale price".into(),
                },
                gas_used: 1_000,
            }],
            object_changes: Vec::new(),
            gas_used: 1_000,
        };
        SubmissionResult::from_outcome(outcome, ResponseOptions::full())
    }

    #[test]
    fn test_render_aborted_keeps_status() {
        let result = aborted();
        report(&result);

        let rendered = render(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["status"]["state"], "aborted");
        assert_eq!(value["status"]["reason"], "MoveAbort: stale price");
        assert_eq!(value["effects"][0]["status"], "failure");
    }

    #[test]
    fn test_render_accepted_omits_optional_fields() {
        let result = SubmissionResult::accepted(BlockDigest(B256::ZERO));
        report(&result);

        let value: serde_json::Value = serde_json::from_str(&render(&result).unwrap()).unwrap();
        assert_eq!(value["status"]["state"], "accepted");
        assert!(value.get("effects").is_none());
        assert!(value.get("object_changes").is_none());
    }
}
