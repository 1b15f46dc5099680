//! Configuration for the wallet gateway

pub mod rpc;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Private key environment variable for the local wallet backend
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Wallet bridge URL environment variable for the HTTP wallet backend
pub const WALLET_RPC_URL_ENV: &str = "WALLET_RPC_URL";

/// Message signed when the caller does not supply one
pub const DEFAULT_MESSAGE: &str = "Hello World";

/// How to wait for a transaction receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptPolling {
    /// Delay between `eth_getTransactionReceipt` polls (milliseconds)
    pub poll_interval_ms: u64,
    /// Polls made before giving up (at least one is always made)
    pub max_attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2_000, // roughly a sixth of a block
            max_attempts: 60,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain the local wallet starts on
    pub chain_id: u64,
    /// Message for `sign` when none is given
    pub default_message: String,
    /// JSON-RPC endpoint of an external wallet (HTTP backend)
    pub wallet_rpc_url: Option<String>,
    /// Receipt polling settings
    pub receipt: ReceiptPolling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: rpc::chains::RINKEBY,
            default_message: DEFAULT_MESSAGE.to_string(),
            wallet_rpc_url: None,
            receipt: ReceiptPolling::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Wallet bridge URL from the config file, else from `WALLET_RPC_URL`
    pub fn wallet_rpc_url(&self) -> Option<String> {
        self.wallet_rpc_url
            .clone()
            .or_else(|| std::env::var(WALLET_RPC_URL_ENV).ok())
    }
}
