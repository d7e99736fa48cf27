//! Wallet selector, import form, send form and logout confirmation
//!
//! Phase transitions:
//!
//! ```text
//! Idle -> Importing -> (Selected | Error)
//! Selected -> SendingTx -> (ReceiptShown | TxError) -> Selected
//! ```
//!
//! Every handler takes `&mut self`, so at most one flow is in progress.

use crate::api::{SaveWalletOutcome, WalletApi, WalletRecord};
use crate::wallet::{
    format_ether, parse_address, parse_amount, validate_import_key, ChainClient, SecureWallet,
    TransactionReceipt, TxJournal,
};
use crate::{Error, Result};
use alloy::primitives::Address;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Selector value that switches to the import form
pub const IMPORT_NEW: &str = "import_new";

const LOAD_FAILED: &str = "Failed to load wallet details.";
const IMPORT_FAILED: &str = "Failed to import wallet";
const TX_FAILED: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletPhase {
    Idle,
    Importing,
    Selected,
    Error,
    SendingTx,
    ReceiptShown,
    TxError,
}

/// Message shown for a failed flow: our own and the API's messages verbatim,
/// a generic one for transport failures
fn user_message(error: &Error, generic: &str) -> String {
    if error.is_transport() {
        generic.to_string()
    } else {
        error.to_string()
    }
}

pub struct WalletView {
    api: Arc<dyn WalletApi>,
    chain: Arc<dyn ChainClient>,
    token: SecretString,
    journal: Option<TxJournal>,

    wallets: Vec<WalletRecord>,
    selected: Option<String>,
    import_mode: bool,
    wallet_address: Option<String>,
    balance: Option<String>,
    private_key: Option<SecretString>,
    error: Option<String>,

    show_tx_form: bool,
    recipient: String,
    amount: String,
    receipt: Option<TransactionReceipt>,
    tx_error: Option<String>,

    logout_prompt: bool,
    phase: WalletPhase,
}

impl WalletView {
    pub fn new(
        api: Arc<dyn WalletApi>,
        chain: Arc<dyn ChainClient>,
        token: &str,
        journal: Option<TxJournal>,
    ) -> Self {
        Self {
            api,
            chain,
            token: SecretString::from(token.to_owned()),
            journal,
            wallets: Vec::new(),
            selected: None,
            import_mode: false,
            wallet_address: None,
            balance: None,
            private_key: None,
            error: None,
            show_tx_form: false,
            recipient: String::new(),
            amount: String::new(),
            receipt: None,
            tx_error: None,
            logout_prompt: false,
            phase: WalletPhase::Idle,
        }
    }

    pub fn phase(&self) -> WalletPhase {
        self.phase
    }

    pub fn wallets(&self) -> &[WalletRecord] {
        &self.wallets
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_import_mode(&self) -> bool {
        self.import_mode
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn balance(&self) -> Option<&str> {
        self.balance.as_deref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn tx_error(&self) -> Option<&str> {
        self.tx_error.as_deref()
    }

    pub fn receipt(&self) -> Option<&TransactionReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_tx_form_shown(&self) -> bool {
        self.show_tx_form
    }

    pub fn is_logout_pending(&self) -> bool {
        self.logout_prompt
    }

    /// Fetch the saved wallets and select the first one
    ///
    /// A failed fetch is only logged; the list stays empty.
    pub async fn load(&mut self) {
        match self.api.list_wallets(self.token.expose_secret()).await {
            Ok(wallets) => {
                tracing::debug!(count = wallets.len(), "Fetched wallets");
                self.wallets = wallets;
                match self.wallets.first().map(|w| w.address.clone()) {
                    Some(first) => self.select(&first).await,
                    None => self.enter_import_mode(),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching wallets");
            }
        }
    }

    /// Forget the selected wallet: selection, address, balance and key go together
    fn clear_selection(&mut self) {
        self.selected = None;
        self.wallet_address = None;
        self.balance = None;
        self.private_key = None;
        self.show_tx_form = false;
    }

    fn enter_import_mode(&mut self) {
        self.clear_selection();
        self.import_mode = true;
        self.phase = WalletPhase::Idle;
    }

    fn fail_selection(&mut self, message: &str) {
        self.clear_selection();
        self.error = Some(message.to_string());
        self.phase = WalletPhase::Error;
    }

    async fn fetch_balance(&self, address: &str) -> Result<String> {
        let address = Address::from_str(address)
            .map_err(|e| Error::Wallet(format!("Invalid wallet address {}: {}", address, e)))?;
        let wei = self.chain.balance(address).await?;
        Ok(format_ether(wei))
    }

    /// Handle a selector change: a saved address or [`IMPORT_NEW`]
    ///
    /// The selected wallet's address, balance and key are only replaced once
    /// its balance has loaded; any failure leaves no wallet selected.
    pub async fn select(&mut self, value: &str) {
        if value == IMPORT_NEW {
            self.enter_import_mode();
            return;
        }
        self.import_mode = false;

        let record = self
            .wallets
            .iter()
            .find(|w| w.address.eq_ignore_ascii_case(value))
            .cloned();
        let Some(record) = record else {
            tracing::warn!(address = %value, "Selected wallet is not in the list");
            self.fail_selection(LOAD_FAILED);
            return;
        };

        match self.fetch_balance(&record.address).await {
            Ok(balance) => {
                self.selected = Some(record.address.clone());
                self.private_key = Some(SecretString::from(record.private_key().to_owned()));
                self.wallet_address = Some(record.address);
                self.balance = Some(balance);
                self.error = None;
                self.show_tx_form = false;
                self.phase = WalletPhase::Selected;
            }
            Err(e) => {
                tracing::error!(error = %e, address = %record.address, "Error selecting wallet");
                self.fail_selection(LOAD_FAILED);
            }
        }
    }

    /// Import a raw private key and save it to the wallet API
    pub async fn import(&mut self, private_key: &str) {
        self.phase = WalletPhase::Importing;
        match self.try_import(private_key.trim()).await {
            Ok(address) => {
                tracing::info!(%address, "Wallet imported");
                self.phase = WalletPhase::Selected;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Wallet import failed");
                self.fail_selection(&user_message(&e, IMPORT_FAILED));
            }
        }
    }

    async fn try_import(&mut self, private_key: &str) -> Result<String> {
        validate_import_key(private_key)?;

        let wallet = SecureWallet::from_hex(private_key)?;
        let address = wallet.address_string();
        let balance = format_ether(self.chain.balance(wallet.address()).await?);

        let record = WalletRecord::new(address.clone(), private_key);
        match self
            .api
            .save_wallet(self.token.expose_secret(), &record)
            .await?
        {
            SaveWalletOutcome::Saved => {
                self.wallets.push(record);
                self.selected = Some(address.clone());
                self.private_key = Some(SecretString::from(private_key.to_owned()));
                self.wallet_address = Some(address.clone());
                self.balance = Some(balance);
                self.error = None;
                self.import_mode = false;
                Ok(address)
            }
            SaveWalletOutcome::Rejected { message } => Err(Error::Rejected(message)),
        }
    }

    /// Show the send form for the selected wallet
    pub fn open_tx_form(&mut self) {
        if self.wallet_address.is_some() && !self.import_mode {
            self.show_tx_form = true;
        }
    }

    /// Submit a transfer from the selected wallet and wait for it to be mined
    pub async fn send(&mut self, recipient: &str, amount: &str) {
        self.recipient = recipient.to_string();
        self.amount = amount.to_string();
        self.receipt = None;
        self.tx_error = None;
        self.phase = WalletPhase::SendingTx;

        match self.try_send().await {
            Ok(receipt) => {
                self.receipt = Some(receipt);
                self.show_tx_form = false;
                self.phase = WalletPhase::ReceiptShown;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error sending transaction");
                self.tx_error = Some(user_message(&e, TX_FAILED));
                self.receipt = None;
                self.phase = WalletPhase::TxError;
            }
        }
    }

    async fn try_send(&mut self) -> Result<TransactionReceipt> {
        if self.recipient.trim().is_empty() || self.amount.trim().is_empty() {
            return Err(Error::Validation(
                "Recipient address and amount are required".to_string(),
            ));
        }
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::Validation("No wallet selected".to_string()))?;
        let wallet = SecureWallet::from_hex(key.expose_secret())?;
        let to = parse_address(&self.recipient)?;
        let value = parse_amount(&self.amount)?;

        let transfer = self.chain.submit_transfer(&wallet, to, value).await?;
        if let Some(journal) = &self.journal {
            journal.record_submitted(&transfer).await;
        }

        let mined = match self.chain.wait_for_receipt(transfer.hash).await {
            Ok(Some(mined)) => mined,
            Ok(None) => {
                let error = Error::Chain("Transaction receipt not found".to_string());
                if let Some(journal) = &self.journal {
                    journal.record_failed(&transfer, &error.to_string()).await;
                }
                tracing::error!(hash = %transfer.hash, "Transaction receipt not found");
                return Err(error);
            }
            Err(e) => {
                if let Some(journal) = &self.journal {
                    journal.record_failed(&transfer, &e.to_string()).await;
                }
                tracing::error!(hash = %transfer.hash, error = %e, "Waiting for receipt failed");
                return Err(e);
            }
        };
        if let Some(journal) = &self.journal {
            journal.record_mined(&transfer, &mined).await;
        }

        if !mined.success {
            let block = mined
                .block_number
                .map(|b| format!(" in block {}", b))
                .unwrap_or_default();
            return Err(Error::Chain(format!(
                "Transaction {} reverted{}",
                transfer.hash, block
            )));
        }

        // Balance is re-read from chain, never decremented locally
        let balance = self.chain.balance(wallet.address()).await?;
        self.balance = Some(format_ether(balance));

        Ok(TransactionReceipt::new(&transfer, &mined))
    }

    /// Clear the send form, the receipt and the transaction error
    pub fn reset_form(&mut self) {
        self.recipient.clear();
        self.amount.clear();
        self.receipt = None;
        self.tx_error = None;
        self.phase = if self.wallet_address.is_some() {
            WalletPhase::Selected
        } else {
            WalletPhase::Idle
        };
    }

    pub fn request_logout(&mut self) {
        self.logout_prompt = true;
    }

    pub fn cancel_logout(&mut self) {
        self.logout_prompt = false;
    }

    /// Drop every client-held secret and all view state
    pub fn wipe(&mut self) {
        self.private_key = None;
        self.token = SecretString::from(String::new());
        self.wallets.clear();
        self.selected = None;
        self.wallet_address = None;
        self.balance = None;
        self.recipient.clear();
        self.amount.clear();
        self.receipt = None;
        self.error = None;
        self.tx_error = None;
        self.show_tx_form = false;
        self.logout_prompt = false;
        self.import_mode = false;
        self.phase = WalletPhase::Idle;
    }
}

impl fmt::Debug for WalletView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletView")
            .field("phase", &self.phase)
            .field("wallets", &self.wallets)
            .field("selected", &self.selected)
            .field("import_mode", &self.import_mode)
            .field("wallet_address", &self.wallet_address)
            .field("balance", &self.balance)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl fmt::Display for WalletView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Ethereum Wallet ==")?;
        writeln!(f, "Select Wallet:")?;
        for wallet in &self.wallets {
            let selected = self.selected.as_deref() == Some(wallet.address.as_str());
            let marker = if selected && !self.import_mode { "*" } else { " " };
            writeln!(f, "  {} {}", marker, wallet.address)?;
        }
        let marker = if self.import_mode { "*" } else { " " };
        writeln!(f, "  {} {} (Import New Wallet)", marker, IMPORT_NEW)?;

        if let (Some(address), false) = (&self.wallet_address, self.import_mode) {
            writeln!(f, "Wallet Address: {}", address)?;
            writeln!(f, "Ether Balance: {} ETH", self.balance.as_deref().unwrap_or("0"))?;

            if self.show_tx_form {
                writeln!(f, "-- Send Transaction --")?;
                writeln!(f, "Recipient Address: {}", self.recipient)?;
                writeln!(f, "Amount in ETH: {}", self.amount)?;
            } else {
                writeln!(f, "[Send Crypto]")?;
            }
            if self.phase == WalletPhase::SendingTx {
                writeln!(f, "Sending transaction, please wait...")?;
            }
            if let Some(tx_error) = &self.tx_error {
                writeln!(f, "[tx error] {}", tx_error)?;
            }
            if let Some(receipt) = &self.receipt {
                writeln!(f, "Transaction Hash: {}", receipt.hash)?;
                writeln!(f, "From: {}", receipt.from)?;
                writeln!(f, "To: {}", receipt.to)?;
                writeln!(f, "Value: {} ETH", receipt.value)?;
                writeln!(f, "Gas Used: {}", receipt.gas_used)?;
                match receipt.block_number {
                    Some(block) => writeln!(f, "Block Number: {}", block)?,
                    None => writeln!(f, "Block Number: pending")?,
                }
                writeln!(f, "Confirmations: {}", receipt.confirmations)?;
                writeln!(f, "Status: {}", receipt.status)?;
            }
        }

        if self.import_mode {
            writeln!(f, "-- Import Wallet --")?;
            if self.phase == WalletPhase::Importing {
                writeln!(f, "Importing wallet...")?;
            } else {
                writeln!(f, "Enter your private key")?;
            }
        }

        if let Some(error) = &self.error {
            writeln!(f, "[error] {}", error)?;
        }

        if self.logout_prompt {
            writeln!(f, "-- Confirm Logout --")?;
            writeln!(f, "Are you sure you want to logout? (confirm / cancel)")?;
        }
        Ok(())
    }
}
