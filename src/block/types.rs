//! Step, argument and error types for transaction blocks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::target::MoveTarget;

/// Upper bound on steps in a single block.
pub const MAX_STEPS: usize = 1024;

/// Errors raised while assembling a block. These are caller bugs and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// Target is not `package::module::function`.
    #[error("invalid target `{target}`: {reason}")]
    InvalidTarget {
        target: String,
        reason: &'static str,
    },

    /// An argument points at a step output this block does not contain (yet).
    #[error(
        "argument {argument} of step {step} references output of step {referenced}, \
         which is not in this block"
    )]
    DanglingReference {
        step: usize,
        argument: usize,
        referenced: usize,
    },

    /// Gas budget missing or not positive.
    #[error("invalid gas budget: {0}")]
    InvalidBudget(&'static str),

    /// Block has no steps to execute.
    #[error("transaction block has no steps")]
    EmptyBlock,

    /// Block already holds `MAX_STEPS` steps.
    #[error("transaction block is limited to {max} steps")]
    TooManySteps { max: usize },
}

/// Handle to the result of a step, usable as an argument of any later step in the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepOutput {
    index: usize,
    /// Id of the block that issued the handle; local to this process.
    #[serde(skip)]
    block: u64,
}

impl StepOutput {
    pub(crate) fn new(block: u64, index: usize) -> Self {
        Self { index, block }
    }

    /// Position of the producing step.
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn block(&self) -> u64 {
        self.block
    }
}

/// A single call argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    /// Literal value passed by value.
    Pure(serde_json::Value),
    /// Existing on-chain object, by id.
    Object(String),
    /// Result of an earlier step in the same block.
    Output(StepOutput),
}

impl From<StepOutput> for Argument {
    fn from(output: StepOutput) -> Self {
        Argument::Output(output)
    }
}

/// One call to an on-chain entry point. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStep {
    target: MoveTarget,
    #[serde(default)]
    arguments: Vec<Argument>,
}

impl TransactionStep {
    pub(crate) fn new(target: MoveTarget, arguments: Vec<Argument>) -> Self {
        Self { target, arguments }
    }

    pub fn target(&self) -> &MoveTarget {
        &self.target
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Indices of the steps whose outputs this step consumes.
    pub fn dependencies(&self) -> impl Iterator<Item = usize> + '_ {
        self.arguments.iter().filter_map(|arg| match arg {
            Argument::Output(output) => Some(output.index()),
            _ => None,
        })
    }
}
