//! Configuration for the wallet client

pub mod rpc;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use rpc::{Network, RpcConfig};

/// Wallet API base URL environment variable name
pub const API_URL_ENV: &str = "WALLET_API_URL";
/// Fallback name used by the web front-end deployments
pub const LEGACY_API_URL_ENV: &str = "API_URL";
/// Session file override
pub const SESSION_FILE_ENV: &str = "WALLET_SESSION_FILE";

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the wallet API (auth and wallet endpoints hang off it)
    pub api_url: String,
    /// Where the `token` / `user` entries are persisted
    pub session_file: PathBuf,
    /// Optional JSONL journal of submitted transactions
    #[serde(default)]
    pub journal_file: Option<PathBuf>,
    /// Upper bound on waiting for a transaction to be mined
    pub receipt_timeout_secs: u64,
    /// Interval between receipt polls (milliseconds)
    pub receipt_poll_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api_url = std::env::var(API_URL_ENV)
            .or_else(|_| std::env::var(LEGACY_API_URL_ENV))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let session_file = std::env::var(SESSION_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Self {
            api_url,
            session_file,
            journal_file: None,
            receipt_timeout_secs: 180,
            receipt_poll_interval_ms: 2_000,
        }
    }
}

impl ClientConfig {
    /// Load a JSON config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// API URL without trailing slash, so endpoint paths can be appended
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn default_session_file() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".eth-wallet").join("session.json"))
        .unwrap_or_else(|_| PathBuf::from("session.json"))
}
