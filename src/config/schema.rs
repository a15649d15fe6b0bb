//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. The admin mnemonic is
//! deliberately absent: it only ever comes from the environment.

use serde::{Deserialize, Serialize};

use crate::block::{BlockError, MoveTarget};
use crate::ledger::{ResponseOptions, WaitLevel};

/// Root configuration for a submission run.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Ledger node endpoints and timeouts.
    pub node: NodeConfig,

    /// On-chain packages to call.
    pub packages: PackageConfig,

    /// Gas budget and confirmation settings.
    pub transaction: TransactionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ledger node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Endpoints tried for read-only queries when the primary is unreachable.
    pub failover_urls: Vec<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// First delay between execution polls, in milliseconds.
    pub poll_interval_ms: u64,

    /// Upper bound on the delay between polls, in milliseconds.
    pub max_poll_interval_ms: u64,

    /// How long to wait for execution before giving up, in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:9000".to_string(),
            failover_urls: Vec::new(),
            request_timeout_secs: 10,
            poll_interval_ms: 500,
            max_poll_interval_ms: 5_000,
            confirmation_timeout_secs: 60,
        }
    }
}

/// Oracle and consumer application packages.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PackageConfig {
    /// Package id of the oracle (`0x` + hex).
    pub oracle_package_id: String,

    /// Oracle module holding the authorize entry point.
    pub oracle_module: String,

    /// Entry point issuing the authorization object.
    pub authorize_function: String,

    /// Package id of the consumer application.
    pub app_package_id: String,

    /// Application module holding the interact entry point.
    pub app_module: String,

    /// Entry point consuming the authorization object.
    pub interact_function: String,
}

impl PackageConfig {
    pub fn authorize_target(&self) -> Result<MoveTarget, BlockError> {
        MoveTarget::new(
            self.oracle_package_id.as_str(),
            self.oracle_module.as_str(),
            self.authorize_function.as_str(),
        )
    }

    pub fn interact_target(&self) -> Result<MoveTarget, BlockError> {
        MoveTarget::new(
            self.app_package_id.as_str(),
            self.app_module.as_str(),
            self.interact_function.as_str(),
        )
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            // No sensible default package; must be configured.
            oracle_package_id: String::new(),
            oracle_module: "mystenlabs_oracle".to_string(),
            authorize_function: "authorize".to_string(),
            app_package_id: String::new(),
            app_module: "interact".to_string(),
            interact_function: "interact".to_string(),
        }
    }
}

/// Transaction settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas budget attached to every block.
    pub gas_budget: u64,

    /// Whether to wait for execution.
    pub wait_level: WaitLevel,

    /// Include per-step effects in the result.
    pub show_effects: bool,

    /// Include object changes in the result.
    pub show_object_changes: bool,
}

impl TransactionConfig {
    pub fn response_options(&self) -> ResponseOptions {
        ResponseOptions {
            show_object_changes: self.show_object_changes,
            show_effects: self.show_effects,
        }
    }
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_budget: 10_000_000,
            wait_level: WaitLevel::WaitForLocalExecution,
            show_effects: true,
            show_object_changes: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
