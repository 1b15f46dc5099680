//! Wallet providers
//!
//! The gateway talks to a wallet only through [`Eip1193`], the Rust shape of
//! an injected `window.ethereum` object: one `request(method, params)` call.
//! Two backends are provided:
//! - [`HttpWallet`] forwards requests through an alloy HTTP provider (wallet
//!   bridge, or a node with unlocked accounts)
//! - [`LocalWallet`] answers account and signing requests with a local key
//!   and forwards everything else to an RPC endpoint
//!
//! The private key of a [`LocalWallet`] never leaves the `signer` module.

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod signer;

pub use http::HttpWallet;
pub use signer::LocalWallet;

use crate::{Error, Result};
use alloy::transports::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC method names used by the gateway
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const PERSONAL_SIGN: &str = "personal_sign";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const GET_BALANCE: &str = "eth_getBalance";
    pub const CALL: &str = "eth_call";
    pub const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// EIP-1193 provider error codes
pub mod codes {
    pub const USER_REJECTED: i64 = crate::error::USER_REJECTED_CODE;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// An EIP-1193 compatible wallet provider
#[async_trait]
pub trait Eip1193: Send + Sync {
    /// Submit an RPC request to the wallet
    ///
    /// Failures reported by the wallet itself come back as [`Error::Rpc`] or,
    /// for user rejections, [`Error::AuthorizationRejected`].
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// Error object returned by a wallet (EIP-1193 `ProviderRpcError`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<ProviderRpcError> for Error {
    fn from(err: ProviderRpcError) -> Self {
        Error::from_rpc(err.code, err.message)
    }
}

/// Map an alloy transport failure; JSON-RPC error replies keep their code
pub(crate) fn transport_error(err: TransportError) -> Error {
    match err.as_error_resp() {
        Some(payload) => ProviderRpcError {
            code: payload.code,
            message: payload.message.to_string(),
            data: payload
                .data
                .as_ref()
                .and_then(|raw| serde_json::from_str(raw.get()).ok()),
        }
        .into(),
        None => Error::Transport(err.to_string()),
    }
}

/// Read the positional parameter at `index`, or fail with an invalid-params error
pub(crate) fn param<'a>(params: &'a Value, index: usize, method: &str) -> Result<&'a Value> {
    params.get(index).ok_or_else(|| Error::Rpc {
        code: codes::INVALID_PARAMS,
        message: format!("{method}: missing parameter {index}"),
    })
}
