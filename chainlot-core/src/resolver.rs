use crate::config::ChainConfig;
use crate::contracts::{
    FeeToken, MockFeeToken, MockPriceFeed, MockVrfCoordinator, PriceFeed, VrfCoordinator,
};
use crate::error::{ChainlotError, Result};
use crate::storage::{DeploymentRecord, DeploymentStore, Storage};
use crate::types::{Address, Amount};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Well-known contract identifiers the resolver understands.
pub const PRICE_FEED: &str = "usd_price_feed";
pub const FEE_TOKEN: &str = "fee_token";
pub const VRF_COORDINATOR: &str = "vrf_coordinator";

/// The locally deployed mock suite; the latest deployment wins.
struct MockSuite {
    price_feed: Arc<MockPriceFeed>,
    fee_token: Arc<MockFeeToken>,
    vrf_coordinator: Arc<MockVrfCoordinator>,
}

/// RPC-backed handles registered by the embedder for live networks.
#[derive(Default)]
struct LiveHandles {
    price_feed: Option<Arc<dyn PriceFeed>>,
    fee_token: Option<Arc<dyn FeeToken>>,
    vrf_coordinator: Option<Arc<dyn VrfCoordinator>>,
}

/// Environment-driven contract factory.
///
/// On local environments the resolver deploys and caches the mock suite,
/// recording every deployment. On forked and live networks it hands out
/// the handles registered against the configured address book; the
/// RPC client behind those handles is the embedder's collaborator, not
/// ours.
pub struct ContractResolver {
    config: ChainConfig,
    storage: Arc<Storage>,
    mocks: RwLock<Option<MockSuite>>,
    live: RwLock<LiveHandles>,
}

impl ContractResolver {
    pub async fn new(config: ChainConfig, data_dir: &Path) -> Result<Self> {
        config.validate()?;

        let db_path = data_dir.join("chainlot.db");
        let storage = Arc::new(Storage::new(&db_path).await?);

        Ok(Self {
            config,
            storage,
            mocks: RwLock::new(None),
            live: RwLock::new(LiveHandles::default()),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Deploy the mock suite. Local environments only.
    pub async fn deploy_mocks(&self, decimals: u8, initial_answer: u128) -> Result<()> {
        if !self.config.environment.allows_mocks() {
            return Err(ChainlotError::config(format!(
                "refusing to deploy mocks on network '{}'",
                self.config.environment
            )));
        }

        let price_feed = Arc::new(MockPriceFeed::new(decimals, initial_answer));
        let fee_token = Arc::new(MockFeeToken::new());
        let vrf_coordinator = Arc::new(MockVrfCoordinator::new(
            self.config.vrf_fee,
            fee_token.clone(),
        ));

        self.record_deployment(PRICE_FEED, price_feed.address()).await?;
        self.record_deployment(FEE_TOKEN, fee_token.address()).await?;
        self.record_deployment(VRF_COORDINATOR, vrf_coordinator.address())
            .await?;

        *self.mocks.write() = Some(MockSuite {
            price_feed,
            fee_token,
            vrf_coordinator,
        });

        tracing::info!("Mocks deployed on '{}'", self.config.environment);
        Ok(())
    }

    pub async fn price_feed(&self) -> Result<Arc<dyn PriceFeed>> {
        if self.config.environment.allows_mocks() {
            self.ensure_mocks().await?;
            return Ok(self.mock_price_feed()? as Arc<dyn PriceFeed>);
        }

        self.live
            .read()
            .price_feed
            .clone()
            .ok_or_else(|| self.missing(PRICE_FEED))
    }

    pub async fn fee_token(&self) -> Result<Arc<dyn FeeToken>> {
        if self.config.environment.allows_mocks() {
            self.ensure_mocks().await?;
            return Ok(self.mock_fee_token()? as Arc<dyn FeeToken>);
        }

        self.live
            .read()
            .fee_token
            .clone()
            .ok_or_else(|| self.missing(FEE_TOKEN))
    }

    pub async fn vrf_coordinator(&self) -> Result<Arc<dyn VrfCoordinator>> {
        if self.config.environment.allows_mocks() {
            self.ensure_mocks().await?;
            return Ok(self.mock_vrf_coordinator()? as Arc<dyn VrfCoordinator>);
        }

        self.live
            .read()
            .vrf_coordinator
            .clone()
            .ok_or_else(|| self.missing(VRF_COORDINATOR))
    }

    /// Concrete mock handles, for harness-side manipulation.
    pub fn mock_price_feed(&self) -> Result<Arc<MockPriceFeed>> {
        self.mocks
            .read()
            .as_ref()
            .map(|suite| suite.price_feed.clone())
            .ok_or_else(|| ChainlotError::contract("mocks not deployed"))
    }

    pub fn mock_fee_token(&self) -> Result<Arc<MockFeeToken>> {
        self.mocks
            .read()
            .as_ref()
            .map(|suite| suite.fee_token.clone())
            .ok_or_else(|| ChainlotError::contract("mocks not deployed"))
    }

    pub fn mock_vrf_coordinator(&self) -> Result<Arc<MockVrfCoordinator>> {
        self.mocks
            .read()
            .as_ref()
            .map(|suite| suite.vrf_coordinator.clone())
            .ok_or_else(|| ChainlotError::contract("mocks not deployed"))
    }

    /// Bind a live price feed client to the configured address.
    pub fn register_price_feed(&self, handle: Arc<dyn PriceFeed>) -> Result<()> {
        self.check_registration(PRICE_FEED, handle.address())?;
        self.live.write().price_feed = Some(handle);
        Ok(())
    }

    pub fn register_fee_token(&self, handle: Arc<dyn FeeToken>) -> Result<()> {
        self.check_registration(FEE_TOKEN, handle.address())?;
        self.live.write().fee_token = Some(handle);
        Ok(())
    }

    pub fn register_vrf_coordinator(&self, handle: Arc<dyn VrfCoordinator>) -> Result<()> {
        self.check_registration(VRF_COORDINATOR, handle.address())?;
        self.live.write().vrf_coordinator = Some(handle);
        Ok(())
    }

    /// Configured address of a well-known contract.
    pub fn resolve_address(&self, name: &str) -> Result<Address> {
        self.config
            .contracts
            .get(name)
            .copied()
            .ok_or_else(|| ChainlotError::MissingContract {
                name: name.to_string(),
                network: self.config.environment.name().to_string(),
            })
    }

    /// Fund `target` with fee tokens so it can pay the coordinator.
    ///
    /// On local mocks the funder is first minted the amount it is about
    /// to send; live networks spend the funder's real balance.
    pub async fn fund_with_token(
        &self,
        target: Address,
        amount: Amount,
        from: Address,
    ) -> Result<bool> {
        let token = self.fee_token().await?;
        if let Ok(mock) = self.mock_fee_token() {
            mock.mint(from, amount);
        }

        let funded = token.transfer(from, target, amount).await?;
        if funded {
            tracing::info!("Funded {} with {} of fee token", target, amount);
        }
        Ok(funded)
    }

    /// Deployment rows recorded for the active network, newest first.
    pub async fn deployments(&self) -> Result<Vec<DeploymentRecord>> {
        let store = DeploymentStore::new(&self.storage);
        store.list(self.config.environment.name()).await
    }

    async fn ensure_mocks(&self) -> Result<()> {
        let deployed = self.mocks.read().is_some();
        if !deployed {
            self.deploy_mocks(self.config.feed_decimals, self.config.initial_answer)
                .await?;
        }
        Ok(())
    }

    async fn record_deployment(&self, contract: &str, address: Address) -> Result<()> {
        let store = DeploymentStore::new(&self.storage);
        store
            .record(&DeploymentRecord {
                id: Uuid::new_v4().to_string(),
                network: self.config.environment.name().to_string(),
                contract: contract.to_string(),
                address,
                deployed_at: Utc::now(),
            })
            .await
    }

    fn check_registration(&self, name: &str, address: Address) -> Result<()> {
        match self.config.contracts.get(name) {
            Some(expected) if *expected == address => Ok(()),
            Some(expected) => Err(ChainlotError::config(format!(
                "handle for '{}' is bound to {}, config says {}",
                name, address, expected
            ))),
            None => Err(ChainlotError::MissingContract {
                name: name.to_string(),
                network: self.config.environment.name().to_string(),
            }),
        }
    }

    fn missing(&self, name: &str) -> ChainlotError {
        match self.config.contracts.get(name) {
            Some(address) => ChainlotError::contract(format!(
                "contract '{}' at {} has no client registered for network '{}'",
                name, address, self.config.environment
            )),
            None => ChainlotError::MissingContract {
                name: name.to_string(),
                network: self.config.environment.name().to_string(),
            },
        }
    }
}
