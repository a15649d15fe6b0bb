//! Session with a ledger node.

use async_trait::async_trait;

use crate::ledger::outcome::ExecutionOutcome;
use crate::ledger::types::{BlockDigest, LedgerResult, SignedBlock};

/// A node that accepts signed blocks and reports their execution.
///
/// Implementations: [`RpcConnection`](crate::ledger::RpcConnection) for a remote node,
/// [`MockLedger`](crate::ledger::MockLedger) for tests.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Hand a signed block to the node. Returns the digest the node acknowledged.
    ///
    /// A refusal before execution is `LedgerError::Rejected`.
    async fn submit(&self, block: &SignedBlock) -> LedgerResult<BlockDigest>;

    /// Outcome of a submitted block, or `None` while it has not executed yet.
    async fn execution_outcome(
        &self,
        digest: &BlockDigest,
    ) -> LedgerResult<Option<ExecutionOutcome>>;
}
