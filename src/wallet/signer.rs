//! Signing key held for the selected wallet
//!
//! SECURITY:
//! - Keys are held in alloy's PrivateKeySigner
//! - Keys are never logged and never appear in `Debug` output
//! - The only way to use the key is to hand [`SecureWallet::wallet`] to a provider

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

/// Exact length of a hex private key accepted by the import form
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Length gate applied to imported keys before anything else happens
///
/// Only the length is checked here; the hex charset is checked when the key is
/// parsed by [`SecureWallet::from_hex`].
pub fn validate_import_key(key: &str) -> Result<()> {
    if key.len() != PRIVATE_KEY_HEX_LEN {
        return Err(Error::Validation("Invalid Private-Key".to_string()));
    }
    Ok(())
}

/// Wallet that protects its private key
pub struct SecureWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        Ok(Self { address, wallet })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the address as an EIP-55 checksummed string
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Get a reference to the EthereumWallet for use with alloy providers
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
