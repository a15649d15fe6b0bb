//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! block / submit / report produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via the `metrics` facade)
//! ```
//!
//! # Design Decisions
//! - Structured fields (digest, step, kind) rather than formatted strings
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
