use crate::error::{ChainlotError, Result};
use crate::types::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Default mock feed precision, matching the mainnet USD feeds.
pub const DEFAULT_FEED_DECIMALS: u8 = 8;
/// Default mock rate: 2000 USD per native unit at 8 decimals.
pub const DEFAULT_INITIAL_ANSWER: u128 = 200_000_000_000;

/// Target environment the toolkit runs against.
///
/// Mocks may only be deployed on local development chains; forked and live
/// networks resolve contracts from the configured address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    GanacheLocal,
    MainnetFork,
    Live(String),
}

impl Environment {
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Development | Environment::GanacheLocal)
    }

    pub fn is_forked(&self) -> bool {
        matches!(self, Environment::MainnetFork)
    }

    pub fn allows_mocks(&self) -> bool {
        self.is_local()
    }

    pub fn name(&self) -> &str {
        match self {
            Environment::Development => "development",
            Environment::GanacheLocal => "ganache-local",
            Environment::MainnetFork => "mainnet-fork",
            Environment::Live(name) => name,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = ChainlotError;

    // any unrecognized name is treated as a live network
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "development" => Environment::Development,
            "ganache-local" => Environment::GanacheLocal,
            "mainnet-fork" => Environment::MainnetFork,
            other => Environment::Live(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub environment: Environment,
    /// Minimum entry stake, in whole USD.
    pub usd_entry_fee: u64,
    /// Fee paid to the randomness coordinator per request, in token wei.
    pub vrf_fee: Amount,
    /// Precision for a freshly deployed mock price feed.
    pub feed_decimals: u8,
    /// Initial answer for a freshly deployed mock price feed.
    pub initial_answer: u128,
    /// Pre-deployed contract addresses, live and forked networks only.
    pub contracts: HashMap<String, Address>,
    /// Named keystore accounts.
    pub keystore: HashMap<String, Address>,
    /// Operator account for live networks.
    pub operator: Option<Address>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            usd_entry_fee: 50,
            // 0.1 token, the coordinator fee the original mocks charge
            vrf_fee: Amount::from_wei(100_000_000_000_000_000),
            feed_decimals: DEFAULT_FEED_DECIMALS,
            initial_answer: DEFAULT_INITIAL_ANSWER,
            contracts: HashMap::new(),
            keystore: HashMap::new(),
            operator: None,
        }
    }
}

impl ChainConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.usd_entry_fee == 0 {
            return Err(ChainlotError::config("USD entry fee must be greater than 0"));
        }

        if self.vrf_fee == Amount::ZERO {
            return Err(ChainlotError::config(
                "Randomness coordinator fee must be greater than 0",
            ));
        }

        if self.initial_answer == 0 {
            return Err(ChainlotError::config(
                "Initial price feed answer must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parsing() {
        assert_eq!(
            "development".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert_eq!(
            "mainnet-fork".parse::<Environment>().unwrap(),
            Environment::MainnetFork
        );
        assert_eq!(
            "sepolia".parse::<Environment>().unwrap(),
            Environment::Live("sepolia".to_string())
        );
    }

    #[test]
    fn mocks_allowed_on_local_only() {
        assert!(Environment::Development.allows_mocks());
        assert!(Environment::GanacheLocal.allows_mocks());
        assert!(!Environment::MainnetFork.allows_mocks());
        assert!(!Environment::Live("mainnet".to_string()).allows_mocks());
    }

    #[test]
    fn default_config_validates() {
        ChainConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_entry_fee_rejected() {
        let config = ChainConfig {
            usd_entry_fee: 0,
            ..ChainConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
