//! Local private-key wallet
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are never serialized to JSON
//! - Keys are never logged

use super::{codes, methods, param, transport_error, Eip1193};
use crate::config::RpcConfig;
use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{hex, Address};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::{PoisonError, RwLock};
use url::Url;

/// Wallet backed by a local private key
///
/// Account, signing and chain-switch requests are answered locally.
/// Transactions are signed locally and submitted to the RPC endpoint of the
/// active chain, and every other method is forwarded to that endpoint.
pub struct LocalWallet {
    /// The signer
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
    /// RPC endpoints the wallet may switch between
    rpc: RpcConfig,
    /// Currently selected chain
    active_chain: RwLock<u64>,
}

impl LocalWallet {
    /// Create a wallet from an environment variable
    ///
    /// # Arguments
    /// * `var_name` - Name of the environment variable containing the private key
    /// * `rpc` - RPC endpoints per chain
    /// * `chain_id` - Chain selected at start
    pub fn from_env(var_name: &str, rpc: RpcConfig, chain_id: u64) -> Result<Self> {
        let key = std::env::var(var_name).map_err(|_| {
            Error::Config(format!(
                "Environment variable {} not set. Required for wallet initialization.",
                var_name
            ))
        })?;

        Self::from_secret(&SecretString::from(key), rpc, chain_id)
    }

    /// Create a wallet from a secret hex-encoded private key
    pub fn from_secret(key: &SecretString, rpc: RpcConfig, chain_id: u64) -> Result<Self> {
        Self::from_hex(key.expose_secret(), rpc, chain_id)
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str, rpc: RpcConfig, chain_id: u64) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Config(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer.clone());

        tracing::info!(address = %address, chain_id, "Local wallet initialized");
        if !rpc.has_chain(chain_id) {
            tracing::warn!(
                chain_id,
                "No RPC URL configured for the starting chain; node requests will fail until one is set"
            );
        }

        Ok(Self {
            signer,
            address,
            wallet,
            rpc,
            active_chain: RwLock::new(chain_id),
        })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain the wallet currently points at
    pub fn active_chain(&self) -> u64 {
        *self
            .active_chain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether node requests on the active chain have an endpoint
    pub fn has_rpc_for_active_chain(&self) -> bool {
        self.rpc.has_chain(self.active_chain())
    }

    fn set_active_chain(&self, chain_id: u64) {
        *self
            .active_chain
            .write()
            .unwrap_or_else(PoisonError::into_inner) = chain_id;
    }

    /// Provider for the active chain with this wallet attached as signer
    fn provider(&self) -> Result<DynProvider> {
        let chain_id = self.active_chain();
        let rpc_url = self.rpc.get(chain_id).ok_or_else(|| Error::Rpc {
            code: codes::CHAIN_DISCONNECTED,
            message: format!("No RPC URL configured for chain {}", chain_id),
        })?;
        let url: Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(url)
            .erased())
    }

    fn ensure_own_address(&self, value: Option<&Value>, method: &str) -> Result<()> {
        let Some(raw) = value.and_then(Value::as_str) else {
            return Ok(());
        };
        let requested: Address = raw
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", raw, e)))?;
        if requested != self.address {
            return Err(Error::Rpc {
                code: codes::UNAUTHORIZED,
                message: format!("{}: account {} is not managed by this wallet", method, raw),
            });
        }
        Ok(())
    }

    async fn personal_sign(&self, params: &Value) -> Result<Value> {
        let data = param(params, 0, methods::PERSONAL_SIGN)?
            .as_str()
            .ok_or_else(|| Error::Rpc {
                code: codes::INVALID_PARAMS,
                message: "personal_sign: message must be a string".to_string(),
            })?;
        self.ensure_own_address(params.get(1), methods::PERSONAL_SIGN)?;

        // Wallets accept both hex-encoded and plain-text messages
        let message = match data.strip_prefix("0x").map(hex::decode) {
            Some(Ok(bytes)) => bytes,
            _ => data.as_bytes().to_vec(),
        };

        let signature = self
            .signer
            .sign_message(&message)
            .await
            .map_err(|e| Error::Signing(e.to_string()))?;

        Ok(Value::String(format!(
            "0x{}",
            hex::encode(signature.as_bytes())
        )))
    }

    fn switch_chain(&self, params: &Value) -> Result<Value> {
        let requested = param(params, 0, methods::SWITCH_CHAIN)?
            .get("chainId")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Rpc {
                code: codes::INVALID_PARAMS,
                message: "wallet_switchEthereumChain: missing chainId".to_string(),
            })?;
        let chain_id = parse_hex_quantity(requested).ok_or_else(|| Error::Rpc {
            code: codes::INVALID_PARAMS,
            message: format!("wallet_switchEthereumChain: invalid chainId {}", requested),
        })?;

        if !self.rpc.has_chain(chain_id) {
            return Err(Error::Rpc {
                code: codes::UNRECOGNIZED_CHAIN,
                message: format!("Unrecognized chain ID {}", requested),
            });
        }

        self.set_active_chain(chain_id);
        tracing::info!(chain_id, "Switched active chain");
        Ok(Value::Null)
    }

    async fn send_transaction(&self, params: &Value) -> Result<Value> {
        let raw = param(params, 0, methods::SEND_TRANSACTION)?;
        self.ensure_own_address(raw.get("from"), methods::SEND_TRANSACTION)?;

        let mut tx: TransactionRequest = serde_json::from_value(raw.clone())?;
        tx.from = Some(self.address);

        let pending = self
            .provider()?
            .send_transaction(tx)
            .await
            .map_err(transport_error)?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(tx_hash = %tx_hash, from = %self.address, "Transaction submitted");
        Ok(serde_json::to_value(tx_hash)?)
    }

    async fn forward(&self, method: &str, params: Value) -> Result<Value> {
        self.provider()?
            .raw_request::<Value, Value>(Cow::Owned(method.to_string()), params)
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl Eip1193 for LocalWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        tracing::debug!(method, "Local wallet request");
        match method {
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => Ok(json!([self.address])),
            methods::CHAIN_ID => Ok(Value::String(format!("{:#x}", self.active_chain()))),
            methods::PERSONAL_SIGN => self.personal_sign(&params).await,
            methods::SWITCH_CHAIN => self.switch_chain(&params),
            methods::SEND_TRANSACTION => self.send_transaction(&params).await,
            _ => self.forward(method, params).await,
        }
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .field("active_chain", &self.active_chain())
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// Parse a `0x`-prefixed hex quantity such as `"0x4"`
pub(crate) fn parse_hex_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}
