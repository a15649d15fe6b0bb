//! In-process ledger used by tests and local runs.
//!
//! Checks what a node would check before execution (digest, signature, minimum gas),
//! then runs steps in order and reports per-step effects. Execution completes after a
//! configurable delay so callers can observe the gap between acceptance and execution.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{keccak256, B256};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tokio::sync::Notify;

use crate::block::Argument;
use crate::ledger::connection::LedgerConnection;
use crate::ledger::outcome::{ExecutionOutcome, ExecutionStatus, ObjectChange, StepEffect};
use crate::ledger::types::{BlockDigest, LedgerError, LedgerResult, SignedBlock, TransactionData};

/// Gas charged per step before argument costs.
pub const BASE_STEP_GAS: u64 = 1_000;
/// Gas charged per argument.
pub const ARGUMENT_GAS: u64 = 250;

const GAS_COIN_TYPE: &str = "0x2::coin::Coin<0x2::gas::GAS>";

/// Configurable behaviour of a `MockLedger`.
#[derive(Debug, Clone)]
struct Behavior {
    execution_delay: Duration,
    min_gas_budget: u64,
    /// `(target or function name, abort reason)`
    aborts: Vec<(String, String)>,
    reject_reason: Option<String>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            execution_delay: Duration::ZERO,
            min_gas_budget: 2_000,
            aborts: Vec::new(),
            reject_reason: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    submitted: DashSet<BlockDigest>,
    outcomes: DashMap<BlockDigest, ExecutionOutcome>,
    executed: Notify,
}

/// Ledger that executes blocks in memory.
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    behavior: Behavior,
    state: Arc<State>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish outcomes only after `delay` has passed since acceptance.
    pub fn with_execution_delay(mut self, delay: Duration) -> Self {
        self.behavior.execution_delay = delay;
        self
    }

    /// Reject blocks whose budget is below `budget`.
    pub fn with_min_gas_budget(mut self, budget: u64) -> Self {
        self.behavior.min_gas_budget = budget;
        self
    }

    /// Abort execution at any step whose full target, or function name, equals `target`.
    pub fn abort_on(mut self, target: impl Into<String>, reason: impl Into<String>) -> Self {
        self.behavior.aborts.push((target.into(), reason.into()));
        self
    }

    /// Refuse every submission with `reason`.
    pub fn reject_all(mut self, reason: impl Into<String>) -> Self {
        self.behavior.reject_reason = Some(reason.into());
        self
    }

    /// Number of blocks accepted so far.
    pub fn submitted_count(&self) -> usize {
        self.state.submitted.len()
    }

    /// Whether the outcome of `digest` has been published.
    pub fn has_executed(&self, digest: &BlockDigest) -> bool {
        self.state.outcomes.contains_key(digest)
    }

    /// Resolve once `digest` has executed.
    pub async fn wait_until_executed(&self, digest: &BlockDigest) {
        loop {
            // Registered before the check so a publish in between is not missed.
            let notified = self.state.executed.notified();
            if self.has_executed(digest) {
                return;
            }
            notified.await;
        }
    }

    fn abort_reason(&self, target: &crate::block::MoveTarget) -> Option<&str> {
        let full = target.to_string();
        self.behavior
            .aborts
            .iter()
            .find(|(pattern, _)| *pattern == full || pattern == target.function())
            .map(|(_, reason)| reason.as_str())
    }

    /// Run the steps of a block in order, stopping at the first failure.
    fn execute(&self, digest: BlockDigest, data: &TransactionData) -> ExecutionOutcome {
        let mut effects = Vec::with_capacity(data.steps.len());
        let mut changes = Vec::new();
        let mut gas_used = 0u64;
        let mut failure = None;

        for (index, step) in data.steps.iter().enumerate() {
            let step_gas = BASE_STEP_GAS + ARGUMENT_GAS * step.arguments().len() as u64;
            gas_used = gas_used.saturating_add(step_gas);

            let error = if gas_used > data.gas_budget {
                Some(format!(
                    "InsufficientGas: step {} needs {} with budget {}",
                    index, gas_used, data.gas_budget
                ))
            } else {
                self.abort_reason(step.target()).map(|reason| {
                    format!("MoveAbort in {} (step {}): {}", step.target(), index, reason)
                })
            };

            if let Some(error) = error {
                effects.push(StepEffect {
                    step: index,
                    target: step.target().clone(),
                    status: ExecutionStatus::Failure { error: error.clone() },
                    gas_used: step_gas,
                });
                failure = Some(error);
                break;
            }

            for arg in step.arguments() {
                match arg {
                    Argument::Output(output) => changes.push(ObjectChange::Deleted {
                        object_id: object_id(&digest, output.index()),
                    }),
                    Argument::Object(id) => changes.push(ObjectChange::Mutated {
                        object_id: id.clone(),
                        object_type: "unknown".to_string(),
                        version: 1,
                    }),
                    Argument::Pure(_) => {}
                }
            }
            changes.push(ObjectChange::Created {
                object_id: object_id(&digest, index),
                object_type: format!(
                    "{}::{}::Output",
                    step.target().package(),
                    step.target().module()
                ),
            });
            effects.push(StepEffect {
                step: index,
                target: step.target().clone(),
                status: ExecutionStatus::Success,
                gas_used: step_gas,
            });
        }

        let status = match failure {
            Some(error) => {
                // Aborted blocks keep no object changes except the gas charge.
                changes.clear();
                ExecutionStatus::Failure { error }
            }
            None => ExecutionStatus::Success,
        };
        changes.push(ObjectChange::Mutated {
            object_id: format!("{}", data.sender),
            object_type: GAS_COIN_TYPE.to_string(),
            version: 1,
        });

        ExecutionOutcome {
            digest,
            status,
            effects,
            object_changes: changes,
            gas_used: gas_used.min(data.gas_budget),
        }
    }

    fn publish(state: &State, outcome: ExecutionOutcome) {
        tracing::debug!(
            digest = %outcome.digest,
            success = outcome.status.is_success(),
            "Mock ledger executed block"
        );
        state.outcomes.insert(outcome.digest, outcome);
        state.executed.notify_waiters();
    }
}

/// Deterministic id for the object created by step `index`.
fn object_id(digest: &BlockDigest, index: usize) -> String {
    let mut seed = digest.0.to_vec();
    seed.extend_from_slice(&(index as u64).to_be_bytes());
    let id: B256 = keccak256(seed);
    id.to_string()
}

#[async_trait]
impl LedgerConnection for MockLedger {
    async fn submit(&self, block: &SignedBlock) -> LedgerResult<BlockDigest> {
        if let Some(reason) = &self.behavior.reject_reason {
            return Err(LedgerError::Rejected {
                reason: reason.clone(),
            });
        }

        block.verify()?;

        let data = block.data();
        if data.gas_budget < self.behavior.min_gas_budget {
            return Err(LedgerError::Rejected {
                reason: format!(
                    "gas budget {} below minimum {}",
                    data.gas_budget, self.behavior.min_gas_budget
                ),
            });
        }

        let digest = *block.digest();
        if !self.state.submitted.insert(digest) {
            return Err(LedgerError::Rejected {
                reason: format!("block {} already submitted", digest),
            });
        }

        let outcome = self.execute(digest, data);
        let delay = self.behavior.execution_delay;
        if delay.is_zero() {
            Self::publish(&self.state, outcome);
        } else {
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                Self::publish(&state, outcome);
            });
        }

        Ok(digest)
    }

    async fn execution_outcome(
        &self,
        digest: &BlockDigest,
    ) -> LedgerResult<Option<ExecutionOutcome>> {
        Ok(self.state.outcomes.get(digest).map(|entry| entry.value().clone()))
    }
}
