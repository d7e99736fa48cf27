//! Chain access through a JSON-RPC provider
//!
//! Balance lookups, transfer submission and receipt waiting. All encoding,
//! signing, broadcast and confirmation mechanics are alloy's; this module only
//! shapes the results for display.

use super::signer::SecureWallet;
use crate::config::RpcConfig;
use crate::{Error, Result};
use alloy::hex;
use alloy::network::ReceiptResponse;
use alloy::primitives::utils::{self as units, parse_ether};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{
    PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder, WatchTxError,
};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::decode_revert_reason;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A transfer accepted by the node but not yet mined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransfer {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// Mining outcome for a submitted transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinedReceipt {
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
    pub confirmations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReceiptStatus {
    Success,
    Failed,
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiptStatus::Success => write!(f, "Success"),
            ReceiptStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Display-only confirmation record for a mined transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Value in ether
    pub value: String,
    pub gas_used: String,
    pub block_number: Option<u64>,
    pub confirmations: u64,
    pub status: ReceiptStatus,
}

impl TransactionReceipt {
    pub fn new(transfer: &SubmittedTransfer, mined: &MinedReceipt) -> Self {
        Self {
            hash: transfer.hash.to_string(),
            from: transfer.from.to_checksum(None),
            to: transfer.to.to_checksum(None),
            value: format_ether(transfer.value),
            gas_used: mined.gas_used.to_string(),
            block_number: mined.block_number,
            confirmations: mined.confirmations,
            status: if mined.success {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Failed
            },
        }
    }
}

/// Chain operations the wallet views depend on
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance in wei
    async fn balance(&self, address: Address) -> Result<U256>;

    /// Sign and broadcast a plain value transfer; returns once the node has
    /// accepted it
    async fn submit_transfer(
        &self,
        wallet: &SecureWallet,
        to: Address,
        value: U256,
    ) -> Result<SubmittedTransfer>;

    /// Wait for `hash` to be mined; `None` when no receipt showed up in time
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Option<MinedReceipt>>;
}

/// [`ChainClient`] backed by an HTTP JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcChain {
    rpc: RpcConfig,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl RpcChain {
    pub fn new(rpc: RpcConfig, receipt_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            rpc,
            receipt_timeout,
            poll_interval,
        }
    }

    pub fn rpc(&self) -> &RpcConfig {
        &self.rpc
    }
}

#[async_trait]
impl ChainClient for RpcChain {
    async fn balance(&self, address: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().connect_http(self.rpc.parsed_url()?);

        provider
            .get_balance(address)
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get balance: {}", e)))
    }

    async fn submit_transfer(
        &self,
        wallet: &SecureWallet,
        to: Address,
        value: U256,
    ) -> Result<SubmittedTransfer> {
        let provider = ProviderBuilder::new()
            .wallet(wallet.wallet().clone())
            .connect_http(self.rpc.parsed_url()?);

        let tx = TransactionRequest::default()
            .from(wallet.address())
            .to(to)
            .value(value);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::Chain(revert_reason(&e.to_string())))?;

        let transfer = SubmittedTransfer {
            hash: *pending.tx_hash(),
            from: wallet.address(),
            to,
            value,
        };
        tracing::info!(
            hash = %transfer.hash,
            from = %transfer.from,
            to = %transfer.to,
            value_wei = %transfer.value,
            "Transaction sent"
        );
        Ok(transfer)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Option<MinedReceipt>> {
        let client =
            RpcClient::new_http(self.rpc.parsed_url()?).with_poll_interval(self.poll_interval);
        let provider = ProviderBuilder::new().connect_client(client);

        let pending = PendingTransactionBuilder::new(provider.root().clone(), hash)
            .with_required_confirmations(1)
            .with_timeout(Some(self.receipt_timeout));

        let receipt = match pending.get_receipt().await {
            Ok(receipt) => receipt,
            Err(e) if is_receipt_timeout(&e) => {
                tracing::warn!(
                    %hash,
                    timeout_secs = self.receipt_timeout.as_secs(),
                    "No receipt before timeout"
                );
                return Ok(None);
            }
            Err(e) => return Err(Error::Rpc(format!("Failed to get receipt: {}", e))),
        };

        let latest = provider
            .get_block_number()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get block number: {}", e)))?;
        let block_number = receipt.block_number;
        let confirmations = block_number
            .map(|mined_at| latest.saturating_sub(mined_at) + 1)
            .unwrap_or(0);

        let mined = MinedReceipt {
            block_number,
            gas_used: receipt.gas_used,
            success: ReceiptResponse::status(&receipt),
            confirmations,
        };
        tracing::info!(%hash, block = ?mined.block_number, success = mined.success, "Transaction mined");
        Ok(Some(mined))
    }
}

/// The watcher gave up waiting, as opposed to the node failing
fn is_receipt_timeout(error: &PendingTransactionError) -> bool {
    matches!(
        error,
        PendingTransactionError::TxWatcher(WatchTxError::Timeout)
    )
}

/// Parse a recipient address typed by the user
pub fn parse_address(input: &str) -> Result<Address> {
    Address::from_str(input.trim())
        .map_err(|e| Error::Validation(format!("Invalid recipient address: {}", e)))
}

/// Parse a decimal ether amount into wei
pub fn parse_amount(input: &str) -> Result<U256> {
    parse_ether(input.trim()).map_err(|e| Error::Validation(format!("Invalid amount: {}", e)))
}

/// Format a wei value as ether, without trailing zeros
pub fn format_ether(value: U256) -> String {
    let full = units::format_ether(value);
    match full.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => full,
    }
}

const REVERTED: &str = "execution reverted";

/// Reduce an RPC error message to its revert reason when there is one
///
/// ABI-encoded revert data in the message wins over the node's own text.
pub fn revert_reason(error: &str) -> String {
    let Some(at) = error.find(REVERTED) else {
        return error.to_string();
    };
    let rest = &error[at + REVERTED.len()..];

    if let Some(reason) = revert_data(rest).and_then(|data| decode_revert_reason(&data)) {
        return match reason.strip_prefix("revert: ") {
            Some(stripped) => stripped.to_string(),
            None => reason,
        };
    }

    let text = rest.trim_start_matches(':').trim_start();
    let text = text.strip_prefix("revert:").unwrap_or(text).trim_start();
    let reason = text
        .split(|c| c == '"' || c == ',')
        .next()
        .unwrap_or_default()
        .trim();
    if reason.is_empty() {
        REVERTED.to_string()
    } else {
        reason.to_string()
    }
}

fn revert_data(text: &str) -> Option<Vec<u8>> {
    let start = text.find("0x")?;
    let digits: String = text[start + 2..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect();
    // Anything shorter than a selector is not revert data
    if digits.len() < 8 {
        return None;
    }
    hex::decode(digits).ok()
}
