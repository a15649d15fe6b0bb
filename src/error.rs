//! Crate-level error type.

use thiserror::Error;

use crate::block::BlockError;
use crate::config::ConfigError;
use crate::ledger::LedgerError;

/// Anything that stops a workflow run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, Error>;
