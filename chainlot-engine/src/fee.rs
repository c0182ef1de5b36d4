use crate::error::Result;
use chainlot_core::{Amount, ChainlotError, PriceRound};

/// Wei per whole native unit.
const WEI_PER_UNIT: u128 = 1_000_000_000_000_000_000;

/// Minimum stake in native wei for a USD-denominated target.
///
/// Rounds up to the nearest wei, so the stake never undercuts the USD
/// minimum whatever the current rate. Recomputed on every query; the
/// feed's answer is not cached.
pub fn entrance_fee(usd_target: u64, round: &PriceRound) -> Result<Amount> {
    if round.answer == 0 {
        return Err(ChainlotError::contract("price feed returned a zero rate").into());
    }

    let scale = 10u128
        .checked_pow(round.decimals as u32)
        .ok_or_else(|| ChainlotError::contract("price feed precision out of range"))?;
    let numerator = (usd_target as u128)
        .checked_mul(WEI_PER_UNIT)
        .and_then(|v| v.checked_mul(scale))
        .ok_or_else(|| ChainlotError::contract("entrance fee computation overflows"))?;

    Ok(Amount::from_wei(numerator.div_ceil(round.answer)))
}
