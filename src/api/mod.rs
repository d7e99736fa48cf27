//! Wallet API client
//!
//! The wallet API owns accounts and the per-user list of saved wallets. This
//! module defines the closed outcome types the views work with and the
//! [`WalletApi`] seam; [`HttpWalletApi`] is the reqwest-backed implementation.

mod http;

pub use http::HttpWalletApi;

use crate::session::Session;
use crate::Result;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Email/password pair submitted to the auth endpoints
pub struct Credentials {
    pub email: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Address/private-key pair the wallet API persists per user
///
/// The API stores and returns the key in plaintext; it is only held here
/// behind [`SecretString`] so it stays out of logs and debug output.
pub struct WalletRecord {
    pub address: String,
    private_key: SecretString,
}

impl WalletRecord {
    pub fn new(address: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            private_key: SecretString::from(private_key.into()),
        }
    }

    pub fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }
}

impl Clone for WalletRecord {
    fn clone(&self) -> Self {
        Self::new(self.address.clone(), self.private_key().to_owned())
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Result of `POST /auth/login`
#[derive(Debug)]
pub enum LoginOutcome {
    LoggedIn(Session),
    Rejected { message: String },
}

/// Result of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    Rejected { message: String },
}

/// Result of `POST /wallets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveWalletOutcome {
    Saved,
    Rejected { message: String },
}

/// Operations offered by the wallet API
///
/// `Err` is reserved for transport and decoding failures; application-level
/// refusals come back as the `Rejected` variant of each outcome.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome>;

    async fn register(&self, credentials: &Credentials) -> Result<RegisterOutcome>;

    /// Saved wallets for the bearer of `token`; a non-2xx answer is
    /// [`Error::Rejected`](crate::Error::Rejected)
    async fn list_wallets(&self, token: &str) -> Result<Vec<WalletRecord>>;

    async fn save_wallet(&self, token: &str, record: &WalletRecord) -> Result<SaveWalletOutcome>;
}
