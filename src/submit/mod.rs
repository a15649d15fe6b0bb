//! Signer/submitter subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionBlock (built, owned by caller)
//!     → signing.rs (budget check, digest, signature; block consumed)
//!     → submitter.rs (submit, optional wait for execution)
//!     → SubmissionResult
//! ```
//!
//! # Design Decisions
//! - Keypair and connection are borrowed, never owned
//! - Signing always precedes submission, submission always precedes confirmation
//! - Execution aborts are results, not errors; nothing is retried

pub mod signing;
pub mod submitter;

pub use signing::sign_block;
pub use submitter::{ConfirmationPolicy, Submitter};
