//! RPC endpoint configuration
//!
//! The client talks to a single Ethereum JSON-RPC node. The endpoint is resolved
//! from the environment in this order:
//! 1. `ETH_RPC_URL` - full URL, highest priority
//! 2. `INFURA_URL` - full URL (name kept for existing front-end deployments)
//! 3. `ALCHEMY_API_KEY` / `INFURA_API_KEY` - URL built for the configured network
//! 4. Public RPC fallback - rate limited, for testing only
//!
//! # Examples
//!
//! ```bash
//! export ETH_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! # or
//! export ALCHEMY_API_KEY="YOUR_KEY" ETH_NETWORK=sepolia
//! ```

use crate::{Error, Result};

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const HOLESKY: u64 = 17000;
}

/// Environment variable names
pub(crate) mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const INFURA_URL: &str = "INFURA_URL";
    pub const ETH_NETWORK: &str = "ETH_NETWORK";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const ETHEREUM: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://ethereum-sepolia-rpc.publicnode.com";
    pub const HOLESKY: &str = "https://ethereum-holesky-rpc.publicnode.com";
}

/// Network the client is pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Sepolia,
    Holesky,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => chains::ETHEREUM,
            Network::Sepolia => chains::SEPOLIA,
            Network::Holesky => chains::HOLESKY,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mainnet" | "ethereum" => Some(Network::Mainnet),
            "sepolia" => Some(Network::Sepolia),
            "holesky" => Some(Network::Holesky),
            _ => None,
        }
    }

    fn alchemy_url(&self, key: &str) -> String {
        let prefix = match self {
            Network::Mainnet => "eth-mainnet",
            Network::Sepolia => "eth-sepolia",
            Network::Holesky => "eth-holesky",
        };
        format!("https://{}.g.alchemy.com/v2/{}", prefix, key)
    }

    fn infura_url(&self, key: &str) -> String {
        let prefix = match self {
            Network::Mainnet => "mainnet",
            Network::Sepolia => "sepolia",
            Network::Holesky => "holesky",
        };
        format!("https://{}.infura.io/v3/{}", prefix, key)
    }

    fn public_url(&self) -> &'static str {
        match self {
            Network::Mainnet => public_rpcs::ETHEREUM,
            Network::Sepolia => public_rpcs::SEPOLIA,
            Network::Holesky => public_rpcs::HOLESKY,
        }
    }
}

/// Resolved JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcConfig {
    url: String,
    network: Network,
}

impl RpcConfig {
    /// Create RPC config from environment variables
    pub fn from_env() -> Self {
        let network = std::env::var(env_vars::ETH_NETWORK)
            .ok()
            .and_then(|name| {
                let parsed = Network::parse(&name);
                if parsed.is_none() {
                    tracing::warn!(network = %name, "Unknown ETH_NETWORK, using mainnet");
                }
                parsed
            })
            .unwrap_or(Network::Mainnet);

        if let Ok(url) = std::env::var(env_vars::ETH_RPC_URL) {
            tracing::debug!("Using ETH_RPC_URL");
            return Self { url, network };
        }
        if let Ok(url) = std::env::var(env_vars::INFURA_URL) {
            tracing::debug!("Using INFURA_URL");
            return Self { url, network };
        }
        if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
            tracing::info!("Building RPC URL from ALCHEMY_API_KEY");
            return Self {
                url: network.alchemy_url(&key),
                network,
            };
        }
        if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
            tracing::info!("Building RPC URL from INFURA_API_KEY");
            return Self {
                url: network.infura_url(&key),
                network,
            };
        }

        tracing::warn!("No RPC configured, using public RPC (rate limited)");
        Self {
            url: network.public_url().to_string(),
            network,
        }
    }

    /// Create with an explicit RPC URL
    pub fn with_url(url: impl Into<String>, network: Network) -> Self {
        Self {
            url: url.into(),
            network,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Parse the endpoint for alloy's HTTP transport
    pub fn parsed_url(&self) -> Result<url::Url> {
        self.url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL {}: {}", self.url, e)))
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
