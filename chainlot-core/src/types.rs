use crate::error::ChainlotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlates a randomness request with its eventual callback.
pub type RequestId = Uuid;

/// 20-byte account or contract identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Fresh pseudo-address for a locally deployed contract.
    pub fn fresh() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"chainlot/contract/");
        hasher.update(Uuid::new_v4().as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ChainlotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(stripped).map_err(|_| ChainlotError::invalid_address(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(ChainlotError::invalid_address(format!(
                "expected 20 bytes, got {}: {}",
                bytes.len(),
                s
            )));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Native-asset amount, denominated in wei.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

const WEI_PER_GWEI: u128 = 1_000_000_000;
const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    pub const fn from_gwei(gwei: u128) -> Self {
        Self(gwei * WEI_PER_GWEI)
    }

    pub const fn from_ether(ether: u128) -> Self {
        Self(ether * WEI_PER_ETHER)
    }

    pub const fn to_wei(self) -> u128 {
        self.0
    }

    pub fn to_ether(self) -> f64 {
        self.0 as f64 / WEI_PER_ETHER as f64
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

/// One observation from a price feed: asset/USD rate at fixed precision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRound {
    pub answer: u128,
    pub decimals: u8,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_round_trips_through_hex() {
        let address = Address::fresh();
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(address, parsed);
    }

    #[test]
    fn address_rejects_short_input() {
        assert!("0xdeadbeef".parse::<Address>().is_err());
    }

    #[test]
    fn amount_conversions() {
        assert_eq!(Amount::from_ether(1).to_wei(), 1_000_000_000_000_000_000);
        assert_eq!(Amount::from_gwei(1).to_wei(), 1_000_000_000);
        assert_eq!(Amount::from_ether(2).to_ether(), 2.0);
    }
}
