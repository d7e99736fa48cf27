//! Wallet keys and chain access
//!
//! Private keys only ever live inside [`SecureWallet`]; chain reads and writes
//! go through the [`ChainClient`] seam.

mod chain;
mod journal;
mod signer;

pub use chain::{
    format_ether, parse_address, parse_amount, revert_reason, ChainClient,
    MinedReceipt, ReceiptStatus, RpcChain, SubmittedTransfer, TransactionReceipt,
};
pub use journal::TxJournal;
pub use signer::{validate_import_key, SecureWallet, PRIVATE_KEY_HEX_LEN};
