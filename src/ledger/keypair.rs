//! Administrative keypair and block signing.
//!
//! # Security
//! - The mnemonic is read ONLY from the environment
//! - Neither the phrase nor the derived key is ever logged or serialized

use alloy::primitives::Address;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use alloy::signers::{Signature, Signer};
use async_trait::async_trait;

use crate::config::ConfigError;
use crate::ledger::types::{BlockDigest, LedgerError, LedgerResult};

/// Environment variable holding the admin mnemonic phrase.
pub const ADMIN_PHRASE_ENV_VAR: &str = "ORACLE_ADMIN_PHRASE";

/// Anything that can sign a block digest on behalf of an address.
#[async_trait]
pub trait BlockSigner: Send + Sync {
    /// Address recorded as the block's sender.
    fn address(&self) -> Address;

    /// Sign a block digest.
    async fn sign_digest(&self, digest: &BlockDigest) -> LedgerResult<Signature>;
}

/// Keypair derived from the admin mnemonic.
#[derive(Clone)]
pub struct AdminKeypair {
    signer: PrivateKeySigner,
    account_index: u32,
}

impl AdminKeypair {
    /// Derive the keypair at `m/44'/60'/0'/0/{account_index}` from a BIP-39 phrase.
    pub fn from_phrase(phrase: &str, account_index: u32) -> Result<Self, ConfigError> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(ConfigError::Credentials("mnemonic phrase is empty".to_string()));
        }

        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .index(account_index)
            .and_then(|builder| builder.build())
            .map_err(|e| ConfigError::Credentials(format!("Invalid mnemonic phrase: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            account_index,
            "Admin keypair derived"
        );

        Ok(Self {
            signer,
            account_index,
        })
    }

    /// Load the phrase from `ORACLE_ADMIN_PHRASE`.
    pub fn from_env(account_index: u32) -> Result<Self, ConfigError> {
        let phrase = std::env::var(ADMIN_PHRASE_ENV_VAR).map_err(|_| {
            ConfigError::Credentials(format!(
                "Environment variable {} not set",
                ADMIN_PHRASE_ENV_VAR
            ))
        })?;

        Self::from_phrase(&phrase, account_index)
    }

    pub fn account_index(&self) -> u32 {
        self.account_index
    }
}

#[async_trait]
impl BlockSigner for AdminKeypair {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_digest(&self, digest: &BlockDigest) -> LedgerResult<Signature> {
        self.signer
            .sign_hash(&digest.0)
            .await
            .map_err(|e| LedgerError::Signing(e.to_string()))
    }
}

impl std::fmt::Debug for AdminKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminKeypair")
            .field("address", &self.signer.address())
            .field("account_index", &self.account_index)
            .finish()
    }
}
