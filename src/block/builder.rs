//! Transaction block builder.
//!
//! # Responsibilities
//! - Append steps in execution order
//! - Hand out step-output handles and check them when they are used
//! - Hold the gas budget until the block is signed

use std::sync::atomic::{AtomicU64, Ordering};

use crate::block::target::MoveTarget;
use crate::block::types::{Argument, BlockError, StepOutput, TransactionStep, MAX_STEPS};

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// An ordered group of calls that executes atomically.
///
/// ```
/// use oracle_submit::block::{Argument, TransactionBlock};
///
/// let mut block = TransactionBlock::new();
/// let authorization = block.add_step("0x1::oracle::authorize", vec![]).unwrap();
/// block
///     .add_step("0x2::interact::interact", vec![Argument::Output(authorization)])
///     .unwrap();
/// block.set_gas_budget(10_000_000).unwrap();
/// assert_eq!(block.len(), 2);
/// ```
#[derive(Debug)]
pub struct TransactionBlock {
    id: u64,
    steps: Vec<TransactionStep>,
    gas_budget: Option<u64>,
}

impl TransactionBlock {
    /// Create an empty block with no budget.
    pub fn new() -> Self {
        Self {
            id: NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed),
            steps: Vec::new(),
            gas_budget: None,
        }
    }

    /// Parse `target` and append a call to it.
    pub fn add_step(
        &mut self,
        target: &str,
        arguments: Vec<Argument>,
    ) -> Result<StepOutput, BlockError> {
        let target: MoveTarget = target.parse()?;
        self.add_call(target, arguments)
    }

    /// Append a call to an already parsed target.
    ///
    /// Every `Argument::Output` must come from a step already in this block.
    pub fn add_call(
        &mut self,
        target: MoveTarget,
        arguments: Vec<Argument>,
    ) -> Result<StepOutput, BlockError> {
        if self.steps.len() >= MAX_STEPS {
            return Err(BlockError::TooManySteps { max: MAX_STEPS });
        }

        let step = self.steps.len();
        for (argument, arg) in arguments.iter().enumerate() {
            if let Argument::Output(output) = arg {
                if output.block() != self.id || output.index() >= step {
                    return Err(BlockError::DanglingReference {
                        step,
                        argument,
                        referenced: output.index(),
                    });
                }
            }
        }

        tracing::trace!(step, target = %target, args = arguments.len(), "Step appended");
        self.steps.push(TransactionStep::new(target, arguments));
        Ok(StepOutput::new(self.id, step))
    }

    /// Set the gas budget. A second call replaces the first.
    pub fn set_gas_budget(&mut self, budget: u64) -> Result<(), BlockError> {
        if budget == 0 {
            return Err(BlockError::InvalidBudget("gas budget must be positive"));
        }
        self.gas_budget = Some(budget);
        Ok(())
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    pub fn steps(&self) -> &[TransactionStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Take the block apart for signing.
    pub(crate) fn into_parts(self) -> (Vec<TransactionStep>, Option<u64>) {
        (self.steps, self.gas_budget)
    }
}

impl Default for TransactionBlock {
    fn default() -> Self {
        Self::new()
    }
}
