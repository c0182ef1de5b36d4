use crate::config::ChainConfig;
use crate::error::{ChainlotError, Result};
use crate::ledger::Ledger;
use crate::types::{Address, Amount};
use sha2::{Digest, Sha256};

/// Number of pre-funded dev accounts on a local chain.
pub const DEV_ACCOUNT_COUNT: usize = 10;
/// Starting balance of each dev account.
pub const DEV_ACCOUNT_FUNDING: Amount = Amount::from_ether(100);

/// Resolves signing accounts for the active environment.
///
/// Local and forked environments use deterministic pre-funded dev
/// accounts; live environments use the configured operator key or a named
/// keystore entry.
pub struct AccountKeeper {
    config: ChainConfig,
    dev_accounts: Vec<Address>,
}

impl AccountKeeper {
    pub fn new(config: ChainConfig) -> Self {
        let dev_accounts = (0..DEV_ACCOUNT_COUNT).map(derive_dev_address).collect();
        Self {
            config,
            dev_accounts,
        }
    }

    pub fn dev_accounts(&self) -> &[Address] {
        &self.dev_accounts
    }

    pub fn dev_account(&self, index: usize) -> Result<Address> {
        self.dev_accounts
            .get(index)
            .copied()
            .ok_or_else(|| ChainlotError::account_not_found(format!("dev account #{}", index)))
    }

    /// Named keystore account configured for the active network.
    pub fn load(&self, id: &str) -> Result<Address> {
        self.config
            .keystore
            .get(id)
            .copied()
            .ok_or_else(|| ChainlotError::account_not_found(format!("keystore entry '{}'", id)))
    }

    /// Default operator: dev account 0 locally and on forks, the
    /// configured operator key on live networks.
    pub fn default_account(&self) -> Result<Address> {
        if self.config.environment.is_local() || self.config.environment.is_forked() {
            return self.dev_account(0);
        }

        self.config.operator.ok_or_else(|| {
            ChainlotError::account_not_found(format!(
                "no operator key configured for network '{}'",
                self.config.environment
            ))
        })
    }

    /// Seed every dev account with its starting balance.
    pub fn fund_dev_accounts(&self, ledger: &Ledger) {
        for address in &self.dev_accounts {
            ledger.credit(*address, DEV_ACCOUNT_FUNDING);
        }
        tracing::debug!(
            "Funded {} dev accounts with {} each",
            self.dev_accounts.len(),
            DEV_ACCOUNT_FUNDING
        );
    }
}

fn derive_dev_address(index: usize) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"chainlot/dev-account/");
    hasher.update((index as u64).to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[..20]);
    Address::new(bytes)
}
