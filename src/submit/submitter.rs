//! Signing, submission, and execution monitoring.
//!
//! # Responsibilities
//! - Sign a built block with the admin keypair
//! - Submit it to the node
//! - Wait for the execution outcome when asked to
//! - Shape the outcome into a `SubmissionResult`
//!
//! # State Transitions
//! ```text
//! Built → Signed:      sign_block (consumes the block)
//! Signed → Submitted:  LedgerConnection::submit
//! Submitted → Confirmed | Aborted: poll LedgerConnection::execution_outcome
//! ```

use std::time::{Duration, Instant};

use tokio::time::{sleep, timeout};

use crate::block::TransactionBlock;
use crate::config::NodeConfig;
use crate::ledger::{
    BlockDigest, BlockSigner, ExecutionOutcome, LedgerConnection, LedgerError, LedgerResult,
    ResponseOptions, SubmissionResult, WaitLevel,
};
use crate::observability::metrics;
use crate::resilience::poll_delay;
use crate::submit::signing::sign_block;

/// How execution is awaited under `WaitLevel::WaitForLocalExecution`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// First delay between polls.
    pub poll_interval: Duration,
    /// Cap on the delay between polls.
    pub max_poll_interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::from(&NodeConfig::default())
    }
}

impl From<&NodeConfig> for ConfirmationPolicy {
    fn from(config: &NodeConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_interval: Duration::from_millis(config.max_poll_interval_ms),
            timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }
}

/// Signs blocks with a borrowed keypair and submits them over a borrowed connection.
#[derive(Debug)]
pub struct Submitter<'a, S: ?Sized, C: ?Sized> {
    signer: &'a S,
    connection: &'a C,
    policy: ConfirmationPolicy,
}

impl<'a, S, C> Submitter<'a, S, C>
where
    S: BlockSigner + ?Sized,
    C: LedgerConnection + ?Sized,
{
    pub fn new(signer: &'a S, connection: &'a C, policy: ConfirmationPolicy) -> Self {
        Self {
            signer,
            connection,
            policy,
        }
    }

    /// Sign `block`, submit it, and resolve it to the requested `wait_level`.
    ///
    /// The block is consumed, so the same instance cannot be submitted twice:
    ///
    /// ```compile_fail
    /// # use oracle_submit::block::TransactionBlock;
    /// # use oracle_submit::ledger::{AdminKeypair, MockLedger, ResponseOptions, WaitLevel};
    /// # use oracle_submit::submit::{ConfirmationPolicy, Submitter};
    /// # async fn demo(keypair: &AdminKeypair, ledger: &MockLedger) {
    /// let submitter = Submitter::new(keypair, ledger, ConfirmationPolicy::default());
    /// let block = TransactionBlock::new();
    /// let options = ResponseOptions::default();
    /// let _ = submitter.sign_and_submit(block, WaitLevel::FireAndForget, options).await;
    /// let _ = submitter.sign_and_submit(block, WaitLevel::FireAndForget, options).await;
    /// # }
    /// ```
    ///
    /// An execution abort is reported as `SubmissionStatus::Aborted`, not as an error.
    pub async fn sign_and_submit(
        &self,
        block: TransactionBlock,
        wait_level: WaitLevel,
        options: ResponseOptions,
    ) -> LedgerResult<SubmissionResult> {
        let result = self.run(block, wait_level, options).await;

        match &result {
            Ok(result) => metrics::record_submission(result.status()),
            Err(e) => {
                match e.submitted_digest() {
                    Some(digest) => tracing::error!(
                        error = %e,
                        kind = e.kind(),
                        %digest,
                        "Submitted block unresolved; it may still execute"
                    ),
                    None => tracing::error!(error = %e, kind = e.kind(), "Block submission failed"),
                }
                metrics::record_submission_error(e.kind());
            }
        }

        result
    }

    async fn run(
        &self,
        block: TransactionBlock,
        wait_level: WaitLevel,
        options: ResponseOptions,
    ) -> LedgerResult<SubmissionResult> {
        let signed = sign_block(block, self.signer).await?;

        let digest = self.connection.submit(&signed).await?;
        if digest != *signed.digest() {
            return Err(LedgerError::Codec(format!(
                "node acknowledged digest {}, expected {}",
                digest,
                signed.digest()
            )));
        }
        tracing::info!(%digest, ?wait_level, "Block submitted");

        match wait_level {
            WaitLevel::FireAndForget => Ok(SubmissionResult::accepted(digest)),
            WaitLevel::WaitForLocalExecution => {
                let outcome = self.wait_for_execution(&digest).await?;
                Ok(SubmissionResult::from_outcome(outcome, options))
            }
        }
    }

    /// Poll until the node reports an outcome for `digest`.
    async fn wait_for_execution(&self, digest: &BlockDigest) -> LedgerResult<ExecutionOutcome> {
        let started = Instant::now();

        let result: Result<LedgerResult<ExecutionOutcome>, _> = timeout(self.policy.timeout, async {
            let mut attempt = 0;

            loop {
                if let Some(outcome) = self.connection.execution_outcome(digest).await? {
                    return Ok(outcome);
                }

                attempt += 1;
                let delay =
                    poll_delay(attempt, self.policy.poll_interval, self.policy.max_poll_interval);
                tracing::debug!(
                    %digest,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Block pending"
                );
                sleep(delay).await;
            }
        })
        .await;

        metrics::record_confirmation_wait(started.elapsed());

        match result {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(LedgerError::OutcomeUnavailable {
                digest: *digest,
                source: Box::new(e),
            }),
            Err(_) => Err(LedgerError::ConfirmationTimeout {
                digest: *digest,
                waited_secs: self.policy.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use alloy::signers::Signature;
    use async_trait::async_trait;

    use crate::block::{Argument, BlockError};
    use crate::ledger::{AdminKeypair, MockLedger, ObjectChange, SignedBlock, SubmissionStatus};

    const TEST_PHRASE: &str = "test test test test test test test test test test test junk";

    fn keypair() -> AdminKeypair {
        AdminKeypair::from_phrase(TEST_PHRASE, 0).unwrap()
    }

    fn fast_policy() -> ConfirmationPolicy {
        ConfirmationPolicy {
            poll_interval: Duration::from_millis(5),
            max_poll_interval: Duration::from_millis(20),
            timeout: Duration::from_secs(5),
        }
    }

    fn authorize_then_interact() -> TransactionBlock {
        let mut block = TransactionBlock::new();
        let authorization = block.add_step("0xa1::oracle::authorize", vec![]).unwrap();
        block
            .add_step("0xb2::interact::interact", vec![Argument::Output(authorization)])
            .unwrap();
        block.set_gas_budget(10_000_000).unwrap();
        block
    }

    struct FailingSigner;

    #[async_trait]
    impl BlockSigner for FailingSigner {
        fn address(&self) -> Address {
            Address::ZERO
        }

        async fn sign_digest(&self, _digest: &BlockDigest) -> LedgerResult<Signature> {
            Err(LedgerError::Signing("hardware key unplugged".into()))
        }
    }

    /// Accepts blocks through a `MockLedger` but cannot read outcomes back.
    struct UnreadableOutcomes(MockLedger);

    #[async_trait]
    impl LedgerConnection for UnreadableOutcomes {
        async fn submit(&self, block: &SignedBlock) -> LedgerResult<BlockDigest> {
            self.0.submit(block).await
        }

        async fn execution_outcome(
            &self,
            _digest: &BlockDigest,
        ) -> LedgerResult<Option<ExecutionOutcome>> {
            Err(LedgerError::Rpc("connection reset".into()))
        }
    }

    #[tokio::test]
    async fn test_confirmed_round_trip() {
        let keypair = keypair();
        let ledger = MockLedger::new();
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap();

        assert_eq!(result.status(), &SubmissionStatus::Confirmed);
        let effects = result.effects().unwrap();
        assert_eq!(effects.len(), 2);
        assert!(effects.iter().all(|e| e.status.is_success()));
        assert_eq!(effects[0].target.function(), "authorize");
        assert_eq!(effects[1].target.function(), "interact");
        let changes = result.object_changes().unwrap();
        assert!(!changes.is_empty());
        assert!(changes.iter().any(|c| matches!(c, ObjectChange::Created { .. })));
    }

    #[tokio::test]
    async fn test_authorize_abort_is_in_band() {
        let keypair = keypair();
        let ledger = MockLedger::new().abort_on("authorize", "oracle not ready");
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .expect("abort is not an error");

        assert!(result.is_aborted());
        match result.status() {
            SubmissionStatus::Aborted { reason } => assert!(reason.contains("oracle not ready")),
            other => panic!("unexpected status {other:?}"),
        }
        let effects = result.effects().unwrap();
        assert_eq!(effects.len(), 1);
        assert!(!effects[0].status.is_success());
        // interact never ran.
        assert!(effects.iter().all(|e| e.step != 1));
    }

    #[tokio::test]
    async fn test_missing_budget_fails_before_network() {
        let keypair = keypair();
        let ledger = MockLedger::new();
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let mut block = TransactionBlock::new();
        block.add_step("0xa1::oracle::authorize", vec![]).unwrap();

        let err = submitter
            .sign_and_submit(block, WaitLevel::WaitForLocalExecution, ResponseOptions::full())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Block(BlockError::InvalidBudget(_))));
        assert_eq!(ledger.submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_signing_failure_propagates() {
        let ledger = MockLedger::new();
        let submitter = Submitter::new(&FailingSigner, &ledger, fast_policy());

        let err = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::FireAndForget,
                ResponseOptions::full(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Signing(_)));
        assert_eq!(ledger.submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_rejection_propagates() {
        let keypair = keypair();
        let ledger = MockLedger::new().with_min_gas_budget(20_000_000);
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let err = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_fire_and_forget_returns_before_execution() {
        let keypair = keypair();
        let ledger = MockLedger::new().with_execution_delay(Duration::from_millis(300));
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::FireAndForget,
                ResponseOptions::full(),
            )
            .await
            .unwrap();

        assert_eq!(result.status(), &SubmissionStatus::Accepted);
        assert!(result.effects().is_none());
        assert!(!ledger.has_executed(result.digest()), "returned after execution");

        timeout(Duration::from_secs(5), ledger.wait_until_executed(result.digest()))
            .await
            .unwrap();
        assert!(ledger.has_executed(result.digest()));
    }

    #[tokio::test]
    async fn test_wait_returns_only_after_execution() {
        let keypair = keypair();
        let delay = Duration::from_millis(150);
        let ledger = MockLedger::new().with_execution_delay(delay);
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let started = Instant::now();
        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap();

        assert!(ledger.has_executed(result.digest()));
        assert!(started.elapsed() >= delay);
        assert!(result.is_confirmed());
    }

    #[tokio::test]
    async fn test_confirmation_timeout() {
        let keypair = keypair();
        let ledger = MockLedger::new().with_execution_delay(Duration::from_secs(2));
        let policy = ConfirmationPolicy {
            timeout: Duration::from_millis(100),
            ..fast_policy()
        };
        let submitter = Submitter::new(&keypair, &ledger, policy);

        let err = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ConfirmationTimeout { .. }));
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_digest() {
        let keypair = keypair();
        let connection = UnreadableOutcomes(MockLedger::new());
        let submitter = Submitter::new(&keypair, &connection, fast_policy());

        let err = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap_err();

        let digest = *err.submitted_digest().expect("digest of the accepted block");
        assert!(connection.0.has_executed(&digest));
        match err {
            LedgerError::OutcomeUnavailable { source, .. } => {
                assert!(matches!(*source, LedgerError::Rpc(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(connection.0.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_options_do_not_change_execution() {
        let keypair = keypair();
        let ledger = MockLedger::new();
        let submitter = Submitter::new(&keypair, &ledger, fast_policy());

        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::default(),
            )
            .await
            .unwrap();

        assert!(result.is_confirmed());
        assert!(result.effects().is_none());
        assert!(result.object_changes().is_none());
        assert!(result.gas_used().is_some());
    }

    #[tokio::test]
    async fn test_dyn_handles() {
        let keypair = keypair();
        let ledger = MockLedger::new();
        let signer: &dyn BlockSigner = &keypair;
        let connection: &dyn LedgerConnection = &ledger;
        let submitter = Submitter::new(signer, connection, fast_policy());

        let result = submitter
            .sign_and_submit(
                authorize_then_interact(),
                WaitLevel::WaitForLocalExecution,
                ResponseOptions::full(),
            )
            .await
            .unwrap();
        assert!(result.is_confirmed());
    }
}
