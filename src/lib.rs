//! Oracle authorization submitter library.
//!
//! Builds an atomic transaction block that calls an oracle's `authorize` entry point and
//! feeds the resulting authorization into a consumer application's `interact` entry point,
//! then signs it with the admin key and submits it to a ledger node.

pub mod block;
pub mod config;
pub mod error;
pub mod ledger;
pub mod observability;
pub mod report;
pub mod resilience;
pub mod submit;
pub mod workflow;

pub use block::{Argument, MoveTarget, StepOutput, TransactionBlock};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use ledger::{SubmissionResult, SubmissionStatus, WaitLevel};
pub use submit::Submitter;
