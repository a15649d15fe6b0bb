//! Transaction block construction.
//!
//! # Data Flow
//! ```text
//! caller
//!     → builder.rs (append steps, wire step outputs into later steps)
//!     → target.rs (parse `package::module::function`)
//!     → TransactionBlock (steps + gas budget, not yet signed)
//!     → submit (consumes the block)
//! ```
//!
//! # Design Decisions
//! - Step outputs are arena indices, validated when the referencing step is appended
//! - A block is never `Clone`; signing consumes it
//! - Nothing here touches the network

pub mod builder;
pub mod target;
pub mod types;

pub use builder::TransactionBlock;
pub use target::MoveTarget;
pub use types::{Argument, BlockError, StepOutput, TransactionStep, MAX_STEPS};
