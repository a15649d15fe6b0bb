//! Ledger-facing types and error definitions.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use alloy::signers::Signature;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::{BlockError, TransactionStep};

/// Errors that can occur while signing, submitting or confirming a block.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Block could not be assembled; raised before any network call.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// The keypair could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The node refused the block before executing it.
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Block was accepted but no outcome appeared in time. It may still execute.
    #[error("block {digest} not executed within {waited_secs} seconds")]
    ConfirmationTimeout { digest: BlockDigest, waited_secs: u64 },

    /// Block was accepted but reading its outcome failed. It may still execute.
    #[error("block {digest} submitted, outcome unknown: {source}")]
    OutcomeUnavailable {
        digest: BlockDigest,
        #[source]
        source: Box<LedgerError>,
    },

    /// Payload could not be encoded or a node response could not be decoded.
    #[error("codec error: {0}")]
    Codec(String),
}

impl LedgerError {
    /// Digest of a block that reached the node, when the error happened after submission.
    pub fn submitted_digest(&self) -> Option<&BlockDigest> {
        match self {
            LedgerError::ConfirmationTimeout { digest, .. }
            | LedgerError::OutcomeUnavailable { digest, .. } => Some(digest),
            _ => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Block(_) => "block",
            LedgerError::Signing(_) => "signing",
            LedgerError::Rejected { .. } => "rejected",
            LedgerError::Rpc(_) => "rpc",
            LedgerError::Timeout(_) => "timeout",
            LedgerError::ConfirmationTimeout { .. } => "confirmation_timeout",
            LedgerError::OutcomeUnavailable { .. } => "outcome_unavailable",
            LedgerError::Codec(_) => "codec",
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Keccak-256 digest identifying a signed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockDigest(pub B256);

impl fmt::Display for BlockDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockDigest {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<B256>()
            .map(BlockDigest)
            .map_err(|e| LedgerError::Codec(format!("invalid digest '{}': {}", s, e)))
    }
}

/// How long submission waits before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WaitLevel {
    /// Return once the node has accepted the block.
    FireAndForget,
    /// Return once the node reports the block's execution outcome.
    #[default]
    WaitForLocalExecution,
}

/// Which optional fields to populate on a `SubmissionResult`. Has no effect on execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseOptions {
    pub show_object_changes: bool,
    pub show_effects: bool,
}

impl ResponseOptions {
    /// Populate every optional field.
    pub fn full() -> Self {
        Self {
            show_object_changes: true,
            show_effects: true,
        }
    }
}

/// Canonical description of a block, as signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: Address,
    pub steps: Vec<TransactionStep>,
    pub gas_budget: u64,
}

impl TransactionData {
    /// Keccak-256 over the canonical JSON encoding.
    pub fn digest(&self) -> LedgerResult<BlockDigest> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| LedgerError::Codec(format!("failed to encode block: {}", e)))?;
        Ok(BlockDigest(keccak256(bytes)))
    }
}

/// A block together with its digest and the sender's signature over that digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    data: TransactionData,
    digest: BlockDigest,
    signature: Bytes,
}

impl SignedBlock {
    pub(crate) fn new(data: TransactionData, digest: BlockDigest, signature: Signature) -> Self {
        Self {
            data,
            digest,
            signature: Bytes::from(signature.as_bytes().to_vec()),
        }
    }

    pub fn data(&self) -> &TransactionData {
        &self.data
    }

    pub fn digest(&self) -> &BlockDigest {
        &self.digest
    }

    /// Decode the 65-byte signature.
    pub fn signature(&self) -> LedgerResult<Signature> {
        Signature::try_from(self.signature.as_ref())
            .map_err(|e| LedgerError::Codec(format!("malformed signature: {}", e)))
    }

    /// Check that the digest matches the data and the signature was made by the sender.
    pub fn verify(&self) -> LedgerResult<()> {
        let expected = self.data.digest()?;
        if expected != self.digest {
            return Err(LedgerError::Rejected {
                reason: format!("digest mismatch: computed {}, claimed {}", expected, self.digest),
            });
        }

        let signer = self
            .signature()?
            .recover_address_from_prehash(&self.digest.0)
            .map_err(|e| LedgerError::Rejected {
                reason: format!("unrecoverable signature: {}", e),
            })?;
        if signer != self.data.sender {
            return Err(LedgerError::Rejected {
                reason: format!(
                    "signature by {} does not match sender {}",
                    signer, self.data.sender
                ),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_signature_bytes(mut self, signature: Vec<u8>) -> Self {
        self.signature = Bytes::from(signature);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> TransactionData {
        let step = TransactionStep::new("0x1::oracle::authorize".parse().unwrap(), Vec::new());
        TransactionData {
            sender: Address::ZERO,
            steps: vec![step],
            gas_budget: 10_000_000,
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = sample_data().digest().unwrap();
        let b = sample_data().digest().unwrap();
        assert_eq!(a, b);

        let mut changed = sample_data();
        changed.gas_budget += 1;
        assert_ne!(a, changed.digest().unwrap());
    }

    #[test]
    fn test_digest_display_round_trip() {
        let digest = sample_data().digest().unwrap();
        let text = digest.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.parse::<BlockDigest>().unwrap(), digest);
        assert!("not-a-digest".parse::<BlockDigest>().is_err());
    }

    #[test]
    fn test_wait_level_serde() {
        assert_eq!(
            serde_json::to_string(&WaitLevel::FireAndForget).unwrap(),
            "\"fire_and_forget\""
        );
        assert_eq!(WaitLevel::default(), WaitLevel::WaitForLocalExecution);
    }

    #[test]
    fn test_error_kind() {
        let err = LedgerError::Rejected {
            reason: "insufficient gas".into(),
        };
        assert_eq!(err.kind(), "rejected");
        assert_eq!(err.to_string(), "submission rejected: insufficient gas");

        let err: LedgerError = BlockError::EmptyBlock.into();
        assert_eq!(err.kind(), "block");
    }
}
