use crate::error::{LotteryError, Result};
use crate::fee;
use crate::state::LotteryState;
use async_trait::async_trait;
use chainlot_core::{
    Address, Amount, ChainlotError, FeeToken, Ledger, PriceFeed, RandomnessConsumer, RequestId,
    VrfCoordinator,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Observable events emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LotteryEvent {
    RequestedRandomness { request_id: RequestId },
    WinnerSelected { winner: Address, payout: Amount },
}

/// Snapshot of the engine for display and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryInfo {
    pub address: Address,
    pub state: LotteryState,
    pub player_count: usize,
    pub pot: Amount,
    pub usd_entry_fee: u64,
    pub recent_winner: Option<Address>,
    pub pending_request: Option<RequestId>,
}

/// USD-gated lottery with oracle-driven winner selection.
///
/// One engine value owns one round sequence: CLOSED -> OPEN ->
/// CALCULATING -> CLOSED. Every operation checks its preconditions before
/// touching any state, so a rejected call leaves the engine unchanged.
pub struct LotteryEngine {
    address: Address,
    ledger: Arc<Ledger>,
    price_feed: Arc<dyn PriceFeed>,
    fee_token: Arc<dyn FeeToken>,
    vrf_coordinator: Arc<dyn VrfCoordinator>,
    usd_entry_fee: u64,
    vrf_fee: Amount,
    state: LotteryState,
    players: Vec<Address>,
    pending_request: Option<RequestId>,
    recent_winner: Option<Address>,
    events: Vec<LotteryEvent>,
}

impl LotteryEngine {
    pub fn new(
        address: Address,
        ledger: Arc<Ledger>,
        price_feed: Arc<dyn PriceFeed>,
        fee_token: Arc<dyn FeeToken>,
        vrf_coordinator: Arc<dyn VrfCoordinator>,
        usd_entry_fee: u64,
        vrf_fee: Amount,
    ) -> Self {
        Self {
            address,
            ledger,
            price_feed,
            fee_token,
            vrf_coordinator,
            usd_entry_fee,
            vrf_fee,
            state: LotteryState::Closed,
            players: Vec::new(),
            pending_request: None,
            recent_winner: None,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn state(&self) -> LotteryState {
        self.state
    }

    pub fn players(&self) -> &[Address] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<Address> {
        self.players.get(index).copied()
    }

    pub fn recent_winner(&self) -> Option<Address> {
        self.recent_winner
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    /// Native balance currently held by the engine.
    pub fn pot_balance(&self) -> Amount {
        self.ledger.balance_of(&self.address)
    }

    pub fn events(&self) -> &[LotteryEvent] {
        &self.events
    }

    pub fn get_info(&self) -> LotteryInfo {
        LotteryInfo {
            address: self.address,
            state: self.state,
            player_count: self.players.len(),
            pot: self.pot_balance(),
            usd_entry_fee: self.usd_entry_fee,
            recent_winner: self.recent_winner,
            pending_request: self.pending_request,
        }
    }

    /// Open the lottery for entries.
    pub fn start_lottery(&mut self) -> Result<()> {
        if self.state != LotteryState::Closed {
            return Err(LotteryError::InvalidStateTransition {
                expected: LotteryState::Closed,
                actual: self.state,
            });
        }

        self.state = LotteryState::Open;
        tracing::info!("Lottery {} open for entries", self.address);
        Ok(())
    }

    /// Current minimum stake, recomputed from the live feed rate.
    pub async fn entrance_fee(&self) -> Result<Amount> {
        let round = self.price_feed.latest_round().await?;
        fee::entrance_fee(self.usd_entry_fee, &round)
    }

    /// Join the current round with `payment` of native asset.
    pub async fn enter(&mut self, caller: Address, payment: Amount) -> Result<()> {
        if self.state != LotteryState::Open {
            return Err(LotteryError::InvalidStateTransition {
                expected: LotteryState::Open,
                actual: self.state,
            });
        }

        let required = self.entrance_fee().await?;
        if payment < required {
            return Err(LotteryError::InsufficientPayment {
                required: required.to_wei(),
                provided: payment.to_wei(),
            });
        }

        self.ledger.transfer(caller, self.address, payment)?;
        self.players.push(caller);

        tracing::info!(
            "Player {} entered lottery {} with {}",
            caller,
            self.address,
            payment
        );
        Ok(())
    }

    /// Close entries and request randomness for winner selection.
    ///
    /// Pays the coordinator its token fee first; a declined payment
    /// leaves the round OPEN so the caller can fund and retry.
    pub async fn end_lottery(&mut self) -> Result<RequestId> {
        if self.state != LotteryState::Open {
            return Err(LotteryError::InvalidStateTransition {
                expected: LotteryState::Open,
                actual: self.state,
            });
        }

        if self.players.is_empty() {
            return Err(LotteryError::NoParticipants);
        }

        let coordinator = self.vrf_coordinator.address();
        let paid = self
            .fee_token
            .transfer(self.address, coordinator, self.vrf_fee)
            .await?;
        if !paid {
            return Err(LotteryError::InsufficientOracleFunding {
                required: self.vrf_fee.to_wei(),
            });
        }

        let request_id = self
            .vrf_coordinator
            .request_randomness(self.address, self.vrf_fee)
            .await?;

        self.pending_request = Some(request_id);
        self.state = LotteryState::Calculating;
        self.events
            .push(LotteryEvent::RequestedRandomness { request_id });

        tracing::info!(
            "Lottery {} calculating, randomness request {}",
            self.address,
            request_id
        );
        Ok(request_id)
    }

    /// Randomness delivery. Only the coordinator identity may call, and
    /// only with the id of the outstanding request.
    ///
    /// Selects `players[randomness % players.len()]`, pays it the whole
    /// pot, and resets the round to CLOSED. A second delivery of the same
    /// id fails: the pending record is gone.
    pub fn on_randomness_received(
        &mut self,
        caller: Address,
        request_id: RequestId,
        randomness: u128,
    ) -> Result<()> {
        if caller != self.vrf_coordinator.address() {
            return Err(LotteryError::UnauthorizedCaller);
        }

        // a delivery without a matching outstanding request is
        // unauthorized, covering replays after the round closed
        match self.pending_request {
            Some(pending) if pending == request_id => {}
            _ => return Err(LotteryError::UnauthorizedCaller),
        }

        if self.state != LotteryState::Calculating {
            return Err(LotteryError::InvalidStateTransition {
                expected: LotteryState::Calculating,
                actual: self.state,
            });
        }

        // non-empty: end_lottery refuses empty rounds and nothing clears
        // players while CALCULATING
        let index = (randomness % self.players.len() as u128) as usize;
        let winner = self.players[index];
        let payout = self.pot_balance();

        self.ledger.transfer(self.address, winner, payout)?;
        self.recent_winner = Some(winner);
        self.players.clear();
        self.pending_request = None;
        self.state = LotteryState::Closed;
        self.events.push(LotteryEvent::WinnerSelected { winner, payout });

        tracing::info!(
            "Lottery {} paid {} to winner {}",
            self.address,
            payout,
            winner
        );
        Ok(())
    }
}

#[async_trait]
impl RandomnessConsumer for LotteryEngine {
    async fn on_randomness_received(
        &mut self,
        caller: Address,
        request_id: RequestId,
        randomness: u128,
    ) -> chainlot_core::Result<()> {
        LotteryEngine::on_randomness_received(self, caller, request_id, randomness)
            .map_err(|e| ChainlotError::contract(e.to_string()))
    }
}

impl std::fmt::Debug for LotteryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryEngine")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("players", &self.players.len())
            .field("pending_request", &self.pending_request)
            .field("recent_winner", &self.recent_winner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy_lottery;
    use chainlot_core::{AccountKeeper, ChainConfig, ContractResolver};
    use tempfile::{tempdir, TempDir};
    use uuid::Uuid;

    struct Harness {
        engine: LotteryEngine,
        ledger: Arc<Ledger>,
        keeper: AccountKeeper,
        resolver: ContractResolver,
        _temp_dir: TempDir,
    }

    async fn harness() -> Harness {
        let temp_dir = tempdir().unwrap();
        let config = ChainConfig::default();
        let keeper = AccountKeeper::new(config.clone());
        let ledger = Arc::new(Ledger::new());
        keeper.fund_dev_accounts(&ledger);

        let resolver = ContractResolver::new(config, temp_dir.path()).await.unwrap();
        let engine = deploy_lottery(&resolver, ledger.clone()).await.unwrap();

        Harness {
            engine,
            ledger,
            keeper,
            resolver,
            _temp_dir: temp_dir,
        }
    }

    async fn fund_lottery(h: &mut Harness) {
        let vrf_fee = h.resolver.config().vrf_fee;
        let funder = h.keeper.default_account().unwrap();
        assert!(h
            .resolver
            .fund_with_token(h.engine.address(), vrf_fee, funder)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn entrance_fee_tracks_feed_rate() {
        let h = harness().await;
        // 2000 USD/unit, 50 USD target -> 0.025 units
        assert_eq!(
            h.engine.entrance_fee().await.unwrap(),
            Amount::from_wei(25_000_000_000_000_000)
        );
    }

    #[tokio::test]
    async fn cannot_enter_unless_started() {
        let mut h = harness().await;
        let account = h.keeper.dev_account(0).unwrap();

        let err = h
            .engine
            .enter(account, Amount::from_ether(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LotteryError::InvalidStateTransition {
                expected: LotteryState::Open,
                actual: LotteryState::Closed,
            }
        ));
    }

    #[tokio::test]
    async fn can_start_and_enter() {
        let mut h = harness().await;
        let account = h.keeper.dev_account(0).unwrap();

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        h.engine.enter(account, fee).await.unwrap();

        assert_eq!(h.engine.player(0), Some(account));
        assert_eq!(h.engine.pot_balance(), fee);
    }

    #[tokio::test]
    async fn start_is_rejected_while_open() {
        let mut h = harness().await;
        h.engine.start_lottery().unwrap();

        assert!(matches!(
            h.engine.start_lottery(),
            Err(LotteryError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn underpayment_is_rejected() {
        let mut h = harness().await;
        let account = h.keeper.dev_account(0).unwrap();

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        let err = h
            .engine
            .enter(account, fee - Amount::from_wei(1))
            .await
            .unwrap_err();

        assert!(matches!(err, LotteryError::InsufficientPayment { .. }));
        assert!(h.engine.players().is_empty());
        assert_eq!(h.engine.pot_balance(), Amount::ZERO);
    }

    #[tokio::test]
    async fn can_end_lottery() {
        let mut h = harness().await;
        let account = h.keeper.dev_account(0).unwrap();

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        h.engine.enter(account, fee).await.unwrap();
        fund_lottery(&mut h).await;

        let request_id = h.engine.end_lottery().await.unwrap();

        assert_eq!(h.engine.state().code(), 2);
        assert_eq!(h.engine.pending_request(), Some(request_id));
        assert!(matches!(
            h.engine.events().last(),
            Some(LotteryEvent::RequestedRandomness { request_id: id }) if *id == request_id
        ));
    }

    #[tokio::test]
    async fn end_requires_oracle_funding() {
        let mut h = harness().await;
        let account = h.keeper.dev_account(0).unwrap();

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        h.engine.enter(account, fee).await.unwrap();

        let err = h.engine.end_lottery().await.unwrap_err();
        assert!(matches!(
            err,
            LotteryError::InsufficientOracleFunding { .. }
        ));
        // round stays open for a funded retry
        assert_eq!(h.engine.state(), LotteryState::Open);

        fund_lottery(&mut h).await;
        h.engine.end_lottery().await.unwrap();
        assert_eq!(h.engine.state(), LotteryState::Calculating);
    }

    #[tokio::test]
    async fn end_requires_participants() {
        let mut h = harness().await;

        h.engine.start_lottery().unwrap();
        fund_lottery(&mut h).await;

        assert!(matches!(
            h.engine.end_lottery().await,
            Err(LotteryError::NoParticipants)
        ));
        assert_eq!(h.engine.state(), LotteryState::Open);
    }

    #[tokio::test]
    async fn can_pick_winner() {
        let mut h = harness().await;

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        for index in 0..3 {
            let account = h.keeper.dev_account(index).unwrap();
            h.engine.enter(account, fee).await.unwrap();
        }
        fund_lottery(&mut h).await;

        let request_id = h.engine.end_lottery().await.unwrap();

        let expected_winner = h.engine.player(777 % 3).unwrap();
        let starting_balance = h.ledger.balance_of(&expected_winner);
        let lottery_balance = h.engine.pot_balance();

        let coordinator = h.resolver.mock_vrf_coordinator().unwrap();
        coordinator
            .fulfill(request_id, 777, &mut h.engine)
            .await
            .unwrap();

        assert_eq!(h.engine.recent_winner(), Some(expected_winner));
        assert_eq!(h.engine.pot_balance(), Amount::ZERO);
        assert_eq!(
            h.ledger.balance_of(&expected_winner),
            starting_balance + lottery_balance
        );
        assert_eq!(h.engine.state(), LotteryState::Closed);
        assert!(h.engine.players().is_empty());
        assert!(matches!(
            h.engine.events().last(),
            Some(LotteryEvent::WinnerSelected { winner, payout })
                if *winner == expected_winner && *payout == lottery_balance
        ));
    }

    #[tokio::test]
    async fn duplicate_callback_is_rejected() {
        let mut h = harness().await;

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        let account = h.keeper.dev_account(0).unwrap();
        h.engine.enter(account, fee).await.unwrap();
        fund_lottery(&mut h).await;

        let request_id = h.engine.end_lottery().await.unwrap();
        let coordinator = h.resolver.mock_vrf_coordinator().unwrap();
        coordinator
            .fulfill(request_id, 777, &mut h.engine)
            .await
            .unwrap();

        // no pending request any more
        let err = h
            .engine
            .on_randomness_received(coordinator.address(), request_id, 777)
            .unwrap_err();
        assert!(matches!(err, LotteryError::UnauthorizedCaller));
    }

    #[tokio::test]
    async fn callback_requires_coordinator_identity() {
        let mut h = harness().await;

        h.engine.start_lottery().unwrap();
        let fee = h.engine.entrance_fee().await.unwrap();
        let account = h.keeper.dev_account(0).unwrap();
        h.engine.enter(account, fee).await.unwrap();
        fund_lottery(&mut h).await;
        let request_id = h.engine.end_lottery().await.unwrap();

        // an arbitrary account cannot deliver randomness
        let err = h
            .engine
            .on_randomness_received(account, request_id, 7)
            .unwrap_err();
        assert!(matches!(err, LotteryError::UnauthorizedCaller));

        // neither can the coordinator with a stale id
        let coordinator = h.resolver.mock_vrf_coordinator().unwrap();
        let err = h
            .engine
            .on_randomness_received(coordinator.address(), Uuid::new_v4(), 7)
            .unwrap_err();
        assert!(matches!(err, LotteryError::UnauthorizedCaller));

        // the round is still waiting for the genuine delivery
        assert_eq!(h.engine.state(), LotteryState::Calculating);
        assert_eq!(h.engine.pending_request(), Some(request_id));
    }
}
