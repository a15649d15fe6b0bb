//! The authorize → interact workflow.
//!
//! Builds a two-step block in which the oracle's authorization object is handed straight
//! to the consumer application, then signs and submits it.

use crate::block::{Argument, BlockError, TransactionBlock};
use crate::config::{AppConfig, PackageConfig};
use crate::error::Result;
use crate::ledger::{BlockSigner, LedgerConnection, SubmissionResult};
use crate::report;
use crate::submit::{ConfirmationPolicy, Submitter};

/// `[authorize(), interact(authorization)]` with the given budget.
pub fn authorize_and_interact_block(
    packages: &PackageConfig,
    gas_budget: u64,
) -> std::result::Result<TransactionBlock, BlockError> {
    let mut block = TransactionBlock::new();
    let authorization = block.add_call(packages.authorize_target()?, Vec::new())?;
    block.add_call(
        packages.interact_target()?,
        vec![Argument::Output(authorization)],
    )?;
    block.set_gas_budget(gas_budget)?;
    Ok(block)
}

/// Build, sign, submit and report one authorize → interact block.
///
/// `config` is expected to be validated already; nothing here reads the environment.
pub async fn run<S, C>(config: &AppConfig, signer: &S, connection: &C) -> Result<SubmissionResult>
where
    S: BlockSigner + ?Sized,
    C: LedgerConnection + ?Sized,
{
    let block = authorize_and_interact_block(&config.packages, config.transaction.gas_budget)?;

    tracing::info!(
        sender = %signer.address(),
        oracle_package = %config.packages.oracle_package_id,
        app_package = %config.packages.app_package_id,
        gas_budget = config.transaction.gas_budget,
        "Submitting authorize → interact block"
    );

    let submitter = Submitter::new(signer, connection, ConfirmationPolicy::from(&config.node));
    let result = submitter
        .sign_and_submit(
            block,
            config.transaction.wait_level,
            config.transaction.response_options(),
        )
        .await?;

    report::report(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages() -> PackageConfig {
        PackageConfig {
            oracle_package_id: "0xa1".into(),
            app_package_id: "0xb2".into(),
            ..PackageConfig::default()
        }
    }

    #[test]
    fn test_block_shape() {
        let block = authorize_and_interact_block(&packages(), 10_000_000).unwrap();
        assert_eq!(block.len(), 2);
        assert_eq!(block.gas_budget(), Some(10_000_000));
        assert_eq!(
            block.steps()[0].target().to_string(),
            "0xa1::mystenlabs_oracle::authorize"
        );
        assert_eq!(block.steps()[1].target().to_string(), "0xb2::interact::interact");
        assert_eq!(block.steps()[1].dependencies().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_bad_inputs() {
        let err = authorize_and_interact_block(&PackageConfig::default(), 1).unwrap_err();
        assert!(matches!(err, BlockError::InvalidTarget { .. }));

        let err = authorize_and_interact_block(&packages(), 0).unwrap_err();
        assert!(matches!(err, BlockError::InvalidBudget(_)));
    }
}
