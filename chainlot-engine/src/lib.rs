//! State-machine lottery engine.
//!
//! A round opens, collects USD-gated entries priced off a live feed,
//! then closes by paying a randomness coordinator and waiting for its
//! callback to select and pay the winner. Collaborators (price feed,
//! fee token, coordinator) come in through the resolver in
//! `chainlot-core`, so the same engine runs against mocks locally and
//! registered clients on live networks.

pub mod engine;
pub mod error;
pub mod fee;
pub mod state;

pub use engine::{LotteryEngine, LotteryEvent, LotteryInfo};
pub use error::{LotteryError, Result};
pub use state::LotteryState;

use chainlot_core::{Address, ContractResolver, Ledger};
use std::sync::Arc;

/// Resolve collaborators and deploy a lottery with the configured fees.
pub async fn deploy_lottery(
    resolver: &ContractResolver,
    ledger: Arc<Ledger>,
) -> Result<LotteryEngine> {
    let price_feed = resolver.price_feed().await?;
    let fee_token = resolver.fee_token().await?;
    let vrf_coordinator = resolver.vrf_coordinator().await?;

    let config = resolver.config();
    let engine = LotteryEngine::new(
        Address::fresh(),
        ledger,
        price_feed,
        fee_token,
        vrf_coordinator,
        config.usd_entry_fee,
        config.vrf_fee,
    );

    tracing::info!(
        "Deployed lottery {} on '{}'",
        engine.address(),
        config.environment
    );
    Ok(engine)
}
