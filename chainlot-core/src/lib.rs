//! chainlot core - local-chain substrate for the lottery toolkit.
//!
//! This library provides the pieces the lottery engine runs on top of:
//! a native-asset ledger, environment-driven account resolution,
//! collaborator contract traits with local mocks, and a contract
//! resolver backed by a deployment record store.

pub mod accounts;
pub mod config;
pub mod contracts;
pub mod error;
pub mod ledger;
pub mod resolver;
pub mod storage;
pub mod types;

pub use accounts::AccountKeeper;
pub use config::{ChainConfig, Environment};
pub use contracts::{
    FeeToken, MockFeeToken, MockPriceFeed, MockVrfCoordinator, PriceFeed, RandomnessConsumer,
    VrfCoordinator,
};
pub use error::{ChainlotError, Result};
pub use ledger::Ledger;
pub use resolver::ContractResolver;
pub use types::{Address, Amount, PriceRound, RequestId};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_substrate_bootstrap() {
        let temp_dir = tempdir().unwrap();
        let config = ChainConfig::default();
        let keeper = AccountKeeper::new(config.clone());
        let ledger = Ledger::new();
        keeper.fund_dev_accounts(&ledger);

        let resolver = ContractResolver::new(config, temp_dir.path()).await.unwrap();
        let feed = resolver.price_feed().await.unwrap();

        assert_eq!(feed.latest_round().await.unwrap().answer, 200_000_000_000);
        assert_eq!(
            ledger.balance_of(&keeper.default_account().unwrap()),
            accounts::DEV_ACCOUNT_FUNDING
        );
    }
}
