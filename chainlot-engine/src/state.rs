use serde::{Deserialize, Serialize};
use std::fmt;

/// Lottery round lifecycle.
///
/// Entries are accepted only while OPEN; the CALCULATING interval spans
/// the randomness request and its asynchronous callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LotteryState {
    Closed = 0,
    Open = 1,
    Calculating = 2,
}

impl LotteryState {
    /// Numeric form, matching the on-chain enum encoding.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LotteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LotteryState::Closed => "closed",
            LotteryState::Open => "open",
            LotteryState::Calculating => "calculating",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_match_contract_encoding() {
        assert_eq!(LotteryState::Closed.code(), 0);
        assert_eq!(LotteryState::Open.code(), 1);
        assert_eq!(LotteryState::Calculating.code(), 2);
    }
}
