//! Resilience helpers.
//!
//! # Design Decisions
//! - Every external call has a deadline (see `ledger::rpc`)
//! - Nothing is retried automatically; only read-only polling backs off
//! - Jittered backoff keeps confirmation polling from hammering the node

pub mod backoff;

pub use backoff::poll_delay;
