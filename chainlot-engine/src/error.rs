use crate::state::LotteryState;
use chainlot_core::ChainlotError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LotteryError>;

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("Invalid state transition: expected {expected}, lottery is {actual}")]
    InvalidStateTransition {
        expected: LotteryState,
        actual: LotteryState,
    },

    #[error("Insufficient payment: entrance fee is {required} wei, got {provided} wei")]
    InsufficientPayment { required: u128, provided: u128 },

    #[error("Insufficient oracle funding: coordinator fee is {required} wei of fee token")]
    InsufficientOracleFunding { required: u128 },

    #[error("Unauthorized caller for randomness callback")]
    UnauthorizedCaller,

    #[error("Cannot end a lottery with no participants")]
    NoParticipants,

    #[error("Core error: {0}")]
    Core(#[from] ChainlotError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
