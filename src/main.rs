//! Oracle authorization submitter.
//!
//! # Architecture Overview
//!
//! ```text
//!   .env + file + env ──▶ AppConfig ───────────────┐
//!                                                  ▼
//!   ORACLE_ADMIN_PHRASE ──▶ AdminKeypair ──▶ ┌─────────────┐      ┌──────────────┐
//!                                            │  workflow   │─────▶│  submitter   │──▶ ledger node
//!   node URL ──────────────▶ RpcConnection ─▶│ authorize → │      │ sign/submit/ │    (JSON-RPC)
//!                                            │  interact   │      │    wait      │
//!                                            └─────────────┘      └──────┬───────┘
//!                                                                        ▼
//!                                                              report (stderr) + JSON (stdout)
//! ```
//!
//! Exit codes: 0 confirmed or accepted, 1 aborted during execution, 2 any other failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use oracle_submit::config::{self, validate_config, AppConfig, ConfigError};
use oracle_submit::ledger::{AdminKeypair, RpcConnection, WaitLevel};
use oracle_submit::observability::logging;
use oracle_submit::{report, workflow, Error};

#[derive(Parser)]
#[command(name = "oracle-submit")]
#[command(
    about = "Authorize with the oracle and interact with the app in one block",
    long_about = None
)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dotenv file to load. Defaults to the nearest `.env`, if any.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override `transaction.wait_level`.
    #[arg(long, value_enum)]
    wait_level: Option<WaitLevel>,

    /// Override `transaction.gas_budget`.
    #[arg(long)]
    gas_budget: Option<u64>,

    /// Derivation index of the admin account.
    #[arg(long, default_value_t = 0)]
    account_index: u32,

    /// Leave per-step effects out of the result.
    #[arg(long)]
    no_effects: bool,

    /// Leave object changes out of the result.
    #[arg(long)]
    no_object_changes: bool,
}

fn load(cli: &Cli) -> Result<AppConfig, ConfigError> {
    // Variables already set in the process win over the file.
    config::load_env_file(cli.env_file.as_deref())?;

    let mut config = config::load_unvalidated(cli.config.as_deref())?;

    if let Some(wait_level) = cli.wait_level {
        config.transaction.wait_level = wait_level;
    }
    if let Some(gas_budget) = cli.gas_budget {
        config.transaction.gas_budget = gas_budget;
    }
    if cli.no_effects {
        config.transaction.show_effects = false;
    }
    if cli.no_object_changes {
        config.transaction.show_object_changes = false;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn execute(cli: &Cli, config: &AppConfig) -> Result<ExitCode, Error> {
    // Both fail fast, before any network traffic.
    let keypair = AdminKeypair::from_env(cli.account_index)?;
    let connection = RpcConnection::new(&config.node)?;

    let result = workflow::run(config, &keypair, &connection).await?;

    match report::render(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render result");
            println!("{}", result);
        }
    }

    Ok(if result.is_aborted() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!("oracle-submit v{} starting", env!("CARGO_PKG_VERSION"));

    match execute(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
