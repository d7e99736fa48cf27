//! Transaction journal
//!
//! Appends one JSON line per transfer event so a broadcast hash survives a
//! failed or interrupted wait for its receipt.

use super::chain::{MinedReceipt, SubmittedTransfer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Entry in the journal
#[derive(Debug, Serialize)]
struct JournalEntry {
    timestamp: DateTime<Utc>,
    event: &'static str,
    hash: String,
    from: String,
    to: String,
    value_wei: String,
    block_number: Option<u64>,
    error: Option<String>,
}

impl JournalEntry {
    fn for_transfer(event: &'static str, transfer: &SubmittedTransfer) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
            hash: transfer.hash.to_string(),
            from: transfer.from.to_checksum(None),
            to: transfer.to.to_checksum(None),
            value_wei: transfer.value.to_string(),
            block_number: None,
            error: None,
        }
    }
}

struct JournalWriter {
    path: PathBuf,
}

impl JournalWriter {
    fn write(&self, entry: &JournalEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// JSONL journal of submitted transfers
#[derive(Clone)]
pub struct TxJournal {
    writer: Arc<Mutex<JournalWriter>>,
}

impl TxJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(JournalWriter { path: path.into() })),
        }
    }

    pub async fn record_submitted(&self, transfer: &SubmittedTransfer) {
        self.append(JournalEntry::for_transfer("submitted", transfer))
            .await;
    }

    pub async fn record_mined(&self, transfer: &SubmittedTransfer, mined: &MinedReceipt) {
        let event = if mined.success { "confirmed" } else { "reverted" };
        let mut entry = JournalEntry::for_transfer(event, transfer);
        entry.block_number = mined.block_number;
        self.append(entry).await;
    }

    pub async fn record_failed(&self, transfer: &SubmittedTransfer, error: &str) {
        let mut entry = JournalEntry::for_transfer("failed", transfer);
        entry.error = Some(error.to_string());
        self.append(entry).await;
    }

    // Journal failures never block a transfer
    async fn append(&self, entry: JournalEntry) {
        let writer = self.writer.lock().await;
        if let Err(e) = writer.write(&entry) {
            tracing::warn!(error = %e, hash = %entry.hash, "Failed to write journal entry");
        }
    }
}
