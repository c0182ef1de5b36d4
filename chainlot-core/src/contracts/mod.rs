//! Collaborator contract interfaces and their local mocks.
//!
//! The traits describe the shapes the lottery engine consumes; live
//! networks bind them to RPC-backed clients supplied by the embedder,
//! local networks to the mocks in [`mocks`].

pub mod mocks;

pub use mocks::{MockFeeToken, MockPriceFeed, MockVrfCoordinator, PendingRandomness};

use crate::error::Result;
use crate::types::{Address, Amount, PriceRound, RequestId};
use async_trait::async_trait;

/// Exchange-rate source (asset/USD) with fixed decimal precision.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    fn address(&self) -> Address;

    async fn latest_round(&self) -> Result<PriceRound>;
}

/// Transferable balance ledger used to pay the randomness coordinator.
#[async_trait]
pub trait FeeToken: Send + Sync {
    fn address(&self) -> Address;

    async fn balance_of(&self, owner: Address) -> Result<Amount>;

    /// Returns false when the transfer is declined; no funds move.
    async fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool>;
}

/// Randomness coordinator: request now, value delivered later via the
/// consumer callback.
#[async_trait]
pub trait VrfCoordinator: Send + Sync {
    fn address(&self) -> Address;

    async fn request_randomness(&self, requester: Address, fee: Amount) -> Result<RequestId>;
}

/// Receiving side of the randomness callback.
///
/// `caller` is the identity the delivery arrives under; implementations
/// must reject anything but their registered coordinator.
#[async_trait]
pub trait RandomnessConsumer: Send {
    async fn on_randomness_received(
        &mut self,
        caller: Address,
        request_id: RequestId,
        randomness: u128,
    ) -> Result<()>;
}
