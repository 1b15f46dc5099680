//! Transaction receipt polling

use crate::config::ReceiptPolling;
use crate::wallet::{methods, Eip1193};
use crate::{Error, Result};
use alloy::primitives::{B256, U64};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// The fields of a receipt the gateway reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptSummary {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// `true` if the transaction executed successfully
    pub status: bool,
    pub gas_used: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: B256,
    #[serde(default)]
    block_number: Option<U64>,
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    gas_used: Option<U64>,
}

impl TryFrom<Value> for ReceiptSummary {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let raw: RawReceipt = serde_json::from_value(value).map_err(|e| {
            Error::InvalidResponse(format!("{}: {}", methods::GET_TRANSACTION_RECEIPT, e))
        })?;
        Ok(Self {
            transaction_hash: raw.transaction_hash,
            block_number: raw.block_number.map(|n| n.to::<u64>()),
            // Pre-Byzantium receipts carry no status field
            status: raw.status.map_or(true, |s| s == U64::from(1)),
            gas_used: raw.gas_used.map(|n| n.to::<u64>()),
        })
    }
}

/// Fetch the receipt once; `None` while the transaction is pending
pub async fn fetch_receipt(wallet: &dyn Eip1193, tx_hash: B256) -> Result<Option<ReceiptSummary>> {
    let raw = wallet
        .request(methods::GET_TRANSACTION_RECEIPT, json!([tx_hash]))
        .await?;
    if raw.is_null() {
        return Ok(None);
    }
    ReceiptSummary::try_from(raw).map(Some)
}

/// Poll until the transaction is mined or `polling.max_attempts` is spent
///
/// At least one poll is always made.
pub async fn wait_for_receipt(
    wallet: &dyn Eip1193,
    tx_hash: B256,
    polling: &ReceiptPolling,
) -> Result<ReceiptSummary> {
    let interval = Duration::from_millis(polling.poll_interval_ms);
    let max_attempts = polling.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if let Some(receipt) = fetch_receipt(wallet, tx_hash).await? {
            tracing::info!(
                tx_hash = %tx_hash,
                block = ?receipt.block_number,
                status = receipt.status,
                "Transaction mined"
            );
            return Ok(receipt);
        }
        tracing::debug!(tx_hash = %tx_hash, attempt, "Receipt not available yet");
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(Error::ReceiptTimeout {
        tx_hash: format!("{:#x}", tx_hash),
        attempts: max_attempts,
    })
}
