use crate::contracts::{FeeToken, PriceFeed, RandomnessConsumer, VrfCoordinator};
use crate::error::{ChainlotError, Result};
use crate::types::{Address, Amount, PriceRound, RequestId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Local stand-in for a USD price feed aggregator.
pub struct MockPriceFeed {
    address: Address,
    decimals: u8,
    answer: RwLock<u128>,
}

impl MockPriceFeed {
    pub fn new(decimals: u8, initial_answer: u128) -> Self {
        Self {
            address: Address::fresh(),
            decimals,
            answer: RwLock::new(initial_answer),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Repoint the feed, e.g. to simulate a rate move mid-test.
    pub fn set_answer(&self, answer: u128) {
        *self.answer.write() = answer;
        tracing::debug!("Price feed {} answer set to {}", self.address, answer);
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    fn address(&self) -> Address {
        self.address
    }

    async fn latest_round(&self) -> Result<PriceRound> {
        Ok(PriceRound {
            answer: *self.answer.read(),
            decimals: self.decimals,
            updated_at: Utc::now(),
        })
    }
}

/// Local stand-in for the coordinator's fee token.
pub struct MockFeeToken {
    address: Address,
    balances: RwLock<HashMap<Address, Amount>>,
}

impl MockFeeToken {
    pub fn new() -> Self {
        Self {
            address: Address::fresh(),
            balances: RwLock::new(HashMap::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Dev faucet: credit `to` out of thin air.
    pub fn mint(&self, to: Address, amount: Amount) {
        let mut balances = self.balances.write();
        let balance = balances.get(&to).copied().unwrap_or(Amount::ZERO);
        balances.insert(to, balance + amount);
    }
}

impl Default for MockFeeToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeeToken for MockFeeToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn balance_of(&self, owner: Address) -> Result<Amount> {
        Ok(self
            .balances
            .read()
            .get(&owner)
            .copied()
            .unwrap_or(Amount::ZERO))
    }

    async fn transfer(&self, from: Address, to: Address, amount: Amount) -> Result<bool> {
        let mut balances = self.balances.write();
        let from_balance = balances.get(&from).copied().unwrap_or(Amount::ZERO);
        if from_balance < amount {
            tracing::debug!(
                "Token transfer of {} from {} declined, balance {}",
                amount,
                from,
                from_balance
            );
            return Ok(false);
        }

        balances.insert(from, from_balance - amount);
        let to_balance = balances.get(&to).copied().unwrap_or(Amount::ZERO);
        balances.insert(to, to_balance + amount);
        Ok(true)
    }
}

/// A randomness request the coordinator has accepted but not fulfilled.
#[derive(Debug, Clone)]
pub struct PendingRandomness {
    pub requester: Address,
    pub requested_at: DateTime<Utc>,
}

/// Local stand-in for the randomness coordinator.
///
/// Requests are registered synchronously; delivery happens whenever the
/// harness calls [`MockVrfCoordinator::fulfill`], which models the
/// arbitrary delay of the real oracle.
pub struct MockVrfCoordinator {
    address: Address,
    fee: Amount,
    token: Arc<MockFeeToken>,
    pending: RwLock<HashMap<RequestId, PendingRandomness>>,
}

impl MockVrfCoordinator {
    pub fn new(fee: Amount, token: Arc<MockFeeToken>) -> Self {
        Self {
            address: Address::fresh(),
            fee,
            token,
            pending: RwLock::new(HashMap::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn pending_request(&self, request_id: &RequestId) -> Option<PendingRandomness> {
        self.pending.read().get(request_id).cloned()
    }

    /// Deliver `randomness` for a pending request, calling back into the
    /// consumer under the coordinator's own identity. The pending record
    /// is cleared only after the consumer accepts the delivery.
    pub async fn fulfill<C>(
        &self,
        request_id: RequestId,
        randomness: u128,
        consumer: &mut C,
    ) -> Result<()>
    where
        C: RandomnessConsumer + ?Sized,
    {
        let known = self.pending.read().contains_key(&request_id);
        if !known {
            return Err(ChainlotError::contract(format!(
                "unknown randomness request {}",
                request_id
            )));
        }

        consumer
            .on_randomness_received(self.address, request_id, randomness)
            .await?;

        self.pending.write().remove(&request_id);
        tracing::info!("Fulfilled randomness request {}", request_id);
        Ok(())
    }
}

#[async_trait]
impl VrfCoordinator for MockVrfCoordinator {
    fn address(&self) -> Address {
        self.address
    }

    async fn request_randomness(&self, requester: Address, fee: Amount) -> Result<RequestId> {
        if fee < self.fee {
            return Err(ChainlotError::contract(format!(
                "randomness fee {} below coordinator minimum {}",
                fee, self.fee
            )));
        }

        // the requester must have paid the fee in tokens up front
        let paid = self.token.balance_of(self.address).await?;
        if paid < self.fee {
            return Err(ChainlotError::contract(format!(
                "coordinator unfunded: holds {}, fee is {}",
                paid, self.fee
            )));
        }

        let request_id = Uuid::new_v4();
        self.pending.write().insert(
            request_id,
            PendingRandomness {
                requester,
                requested_at: Utc::now(),
            },
        );

        tracing::info!(
            "Randomness request {} registered for {}",
            request_id,
            requester
        );
        Ok(request_id)
    }
}
