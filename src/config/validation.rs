//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check package ids, identifiers and URLs before any network call
//! - Validate value ranges (budget > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::AppConfig;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "node.rpc_url", &config.node.rpc_url);
    for url in &config.node.failover_urls {
        check_url(&mut errors, "node.failover_urls", url);
    }
    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new("node.request_timeout_secs", "must be positive"));
    }
    if config.node.poll_interval_ms == 0 {
        errors.push(ValidationError::new("node.poll_interval_ms", "must be positive"));
    }
    if config.node.max_poll_interval_ms < config.node.poll_interval_ms {
        errors.push(ValidationError::new(
            "node.max_poll_interval_ms",
            "must not be below node.poll_interval_ms",
        ));
    }
    if config.node.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new("node.confirmation_timeout_secs", "must be positive"));
    }

    let packages = &config.packages;
    check_package_id(&mut errors, "packages.oracle_package_id", &packages.oracle_package_id);
    check_package_id(&mut errors, "packages.app_package_id", &packages.app_package_id);
    check_identifier(&mut errors, "packages.oracle_module", &packages.oracle_module);
    check_identifier(&mut errors, "packages.authorize_function", &packages.authorize_function);
    check_identifier(&mut errors, "packages.app_module", &packages.app_module);
    check_identifier(&mut errors, "packages.interact_function", &packages.interact_function);

    if config.transaction.gas_budget == 0 {
        errors.push(ValidationError::new("transaction.gas_budget", "must be positive"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}' in '{}'", url.scheme(), value),
        )),
        Err(e) => errors.push(ValidationError::new(
            field,
            format!("invalid URL '{}': {}", value, e),
        )),
    }
}

/// `0x` followed by 1 to 64 hex digits.
fn check_package_id(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let Some(hex) = value.strip_prefix("0x") else {
        errors.push(ValidationError::new(field, format!("'{}' must start with 0x", value)));
        return;
    };
    if hex.is_empty() || hex.len() > 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        errors.push(ValidationError::new(
            field,
            format!("'{}' must be 0x followed by 1-64 hex digits", value),
        ));
    }
}

/// Move identifier: ASCII letter or `_`, then letters, digits or `_`.
fn check_identifier(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        errors.push(ValidationError::new(field, format!("'{}' is not a valid identifier", value)));
    }
}
