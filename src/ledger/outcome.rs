//! Execution outcomes reported by the node and the result handed back to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::MoveTarget;
use crate::ledger::types::{BlockDigest, ResponseOptions};

/// Whether a block (or a single step) executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Effect of one executed step. Steps after an aborted one have no effect entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEffect {
    pub step: usize,
    pub target: MoveTarget,
    #[serde(flatten)]
    pub status: ExecutionStatus,
    pub gas_used: u64,
}

/// Change to on-chain object state caused by a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectChange {
    Created {
        object_id: String,
        object_type: String,
    },
    Mutated {
        object_id: String,
        object_type: String,
        version: u64,
    },
    Deleted {
        object_id: String,
    },
}

/// Full outcome of an executed block, as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub digest: BlockDigest,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub effects: Vec<StepEffect>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    pub gas_used: u64,
}

/// Resolved state of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Accepted by the node; execution was not awaited.
    Accepted,
    /// Executed successfully.
    Confirmed,
    /// Accepted, then aborted during execution.
    Aborted { reason: String },
}

/// Outcome of `sign_and_submit`. Only the submitter creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    digest: BlockDigest,
    status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_used: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effects: Option<Vec<StepEffect>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_changes: Option<Vec<ObjectChange>>,
}

impl SubmissionResult {
    pub(crate) fn accepted(digest: BlockDigest) -> Self {
        Self {
            digest,
            status: SubmissionStatus::Accepted,
            gas_used: None,
            effects: None,
            object_changes: None,
        }
    }

    pub(crate) fn from_outcome(outcome: ExecutionOutcome, options: ResponseOptions) -> Self {
        let status = match outcome.status {
            ExecutionStatus::Success => SubmissionStatus::Confirmed,
            ExecutionStatus::Failure { error } => SubmissionStatus::Aborted { reason: error },
        };

        Self {
            digest: outcome.digest,
            status,
            gas_used: Some(outcome.gas_used),
            effects: options.show_effects.then_some(outcome.effects),
            object_changes: options.show_object_changes.then_some(outcome.object_changes),
        }
    }

    pub fn digest(&self) -> &BlockDigest {
        &self.digest
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn gas_used(&self) -> Option<u64> {
        self.gas_used
    }

    pub fn effects(&self) -> Option<&[StepEffect]> {
        self.effects.as_deref()
    }

    pub fn object_changes(&self) -> Option<&[ObjectChange]> {
        self.object_changes.as_deref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == SubmissionStatus::Confirmed
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, SubmissionStatus::Aborted { .. })
    }
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            SubmissionStatus::Accepted => {
                write!(f, "{}: accepted (execution not awaited)", self.digest)
            }
            SubmissionStatus::Confirmed => {
                write!(f, "{}: confirmed", self.digest)?;
                if let Some(effects) = &self.effects {
                    write!(f, ", {} step effects", effects.len())?;
                }
                if let Some(changes) = &self.object_changes {
                    write!(f, ", {} object changes", changes.len())?;
                }
                Ok(())
            }
            SubmissionStatus::Aborted { reason } => {
                write!(f, "{}: ABORTED: {}", self.digest, reason)
            }
        }
    }
}
