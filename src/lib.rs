//! Ethereum Wallet Client
//!
//! A terminal front-end for a custodial-style wallet service:
//! - Email/password accounts against a wallet API
//! - Saved wallets listed per account, new ones imported from a private key
//! - Balances and ether transfers through a JSON-RPC provider
//!
//! # Security Model
//!
//! - Tokens and private keys are held as `SecretString` and redacted from
//!   `Debug` output and logs
//! - The session lives in an explicit [`SessionStore`] over injected storage
//! - Logout wipes every client-held secret and the persisted session

pub mod api;
pub mod config;
pub mod session;
pub mod shell;
pub mod views;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use api::{HttpWalletApi, WalletApi};
pub use config::{ClientConfig, Network, RpcConfig};
pub use error::{Error, Result};
pub use session::{FileStorage, SessionStore};
pub use views::App;
pub use wallet::{ChainClient, RpcChain, TxJournal};
