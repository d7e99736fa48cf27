//! Error types for the wallet client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected locally, before any network call
    #[error("{0}")]
    Validation(String),

    /// The wallet API answered with a non-2xx status; carries its message verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transaction reverted, receipt missing or similar on-chain failure
    #[error("{0}")]
    Chain(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure happened below the application layer (HTTP or RPC
    /// transport). Views show a generic message for these and log the detail.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Rpc(_) | Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
