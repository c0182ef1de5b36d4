use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainlotError>;

#[derive(Error, Debug)]
pub enum ChainlotError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Insufficient funds: need {need} wei, have {available} wei")]
    InsufficientFunds { need: u128, available: u128 },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No deployment for contract '{name}' on network '{network}'")]
    MissingContract { name: String, network: String },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChainlotError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub fn account_not_found(msg: impl Into<String>) -> Self {
        Self::AccountNotFound(msg.into())
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
