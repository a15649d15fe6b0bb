//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `node.rpc_url`.
pub const FULLNODE_URL_ENV_VAR: &str = "ORACLE_FULLNODE_URL";
/// Overrides `packages.oracle_package_id`.
pub const ORACLE_PACKAGE_ENV_VAR: &str = "ORACLE_PACKAGE_ID";
/// Overrides `packages.app_package_id`.
pub const APP_PACKAGE_ENV_VAR: &str = "ORACLE_APP_PACKAGE_ID";
/// Overrides `transaction.gas_budget`.
pub const GAS_BUDGET_ENV_VAR: &str = "ORACLE_GAS_BUDGET";

/// Bad or missing configuration. Fatal; raised before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value in {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Failed to load {path}: {reason}")]
    EnvFile { path: PathBuf, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// Mnemonic missing or unusable.
    #[error("Credential error: {0}")]
    Credentials(String),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document. Missing sections fall back to defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(FULLNODE_URL_ENV_VAR) {
        config.node.rpc_url = url;
    }
    if let Some(id) = lookup(ORACLE_PACKAGE_ENV_VAR) {
        config.packages.oracle_package_id = id;
    }
    if let Some(id) = lookup(APP_PACKAGE_ENV_VAR) {
        config.packages.app_package_id = id;
    }
    if let Some(budget) = lookup(GAS_BUDGET_ENV_VAR) {
        config.transaction.gas_budget = budget.trim().parse().map_err(|e| ConfigError::Env {
            var: GAS_BUDGET_ENV_VAR,
            reason: format!("'{}': {}", budget, e),
        })?;
    }
    Ok(())
}

/// Read defaults, then the TOML file if given, then overrides from `lookup`. Not validated.
pub fn read_config<F>(path: Option<&Path>, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    Ok(config)
}

/// [`read_config`] against the process environment.
///
/// For callers that layer further overrides; they must call `validate_config` themselves.
pub fn load_unvalidated(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    read_config(path, |var| std::env::var(var).ok())
}

/// Load and validate configuration from the file and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = load_unvalidated(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load a dotenv file into the process environment without replacing variables already set.
///
/// With no `path`, `.env` is looked up in the working directory and its parents, and a
/// missing file is not an error. Returns the file that was loaded.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|e| ConfigError::EnvFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(ConfigError::EnvFile {
                path: PathBuf::from(".env"),
                reason: e.to_string(),
            }),
        },
    }
}
