//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment (admin mnemonic) + AppConfig (node URL)
//!     → keypair.rs (key derivation, digest signing)
//!     → rpc.rs (JSON-RPC session with timeouts and failover)
//!     → submit (sign, submit, wait for execution)
//!     → outcome.rs (status, effects, object changes)
//! ```
//!
//! # Security Constraints
//! - Mnemonic ONLY from environment variables
//! - Never log the mnemonic or derived key
//! - All RPC calls have configurable timeouts

pub mod connection;
pub mod keypair;
pub mod mock;
pub mod outcome;
pub mod rpc;
pub mod types;

pub use connection::LedgerConnection;
pub use keypair::{AdminKeypair, BlockSigner};
pub use mock::MockLedger;
pub use outcome::{
    ExecutionOutcome, ExecutionStatus, ObjectChange, StepEffect, SubmissionResult,
    SubmissionStatus,
};
pub use rpc::RpcConnection;
pub use types::{
    BlockDigest, LedgerError, LedgerResult, ResponseOptions, SignedBlock, TransactionData,
    WaitLevel,
};
