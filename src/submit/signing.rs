//! Turning a built block into a signed one.

use crate::block::{BlockError, TransactionBlock};
use crate::ledger::{BlockSigner, LedgerResult, SignedBlock, TransactionData};

/// Consume `block` and sign it on behalf of `signer`.
///
/// Budget and emptiness are checked here, so a bad block fails before any network call.
pub async fn sign_block<S>(block: TransactionBlock, signer: &S) -> LedgerResult<SignedBlock>
where
    S: BlockSigner + ?Sized,
{
    let (steps, gas_budget) = block.into_parts();
    let gas_budget = gas_budget.ok_or(BlockError::InvalidBudget("gas budget not set"))?;
    if steps.is_empty() {
        return Err(BlockError::EmptyBlock.into());
    }

    let data = TransactionData {
        sender: signer.address(),
        steps,
        gas_budget,
    };
    let digest = data.digest()?;
    let signature = signer.sign_digest(&digest).await?;

    tracing::debug!(
        %digest,
        sender = %data.sender,
        steps = data.steps.len(),
        gas_budget,
        "Block signed"
    );
    Ok(SignedBlock::new(data, digest, signature))
}
