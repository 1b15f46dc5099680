//! Error types for the wallet gateway

use crate::amount::AmountError;
use thiserror::Error;

/// EIP-1193 code for "the user rejected the request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Broad classification of a failure, as seen by a caller of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The user (or the wallet on their behalf) declined the request
    AuthorizationRejected,
    /// Anything else: transport, RPC, library or malformed input
    TransportOrCallFailure,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("No wallet provider available")]
    WalletUnavailable,

    #[error("Authorization rejected: {0}")]
    AuthorizationRejected(String),

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected wallet response: {0}")]
    InvalidResponse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No receipt for {tx_hash} after {attempts} attempts")]
    ReceiptTimeout { tx_hash: String, attempts: u32 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build the error for an EIP-1193 error object returned by a wallet
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE {
            Error::AuthorizationRejected(message)
        } else {
            Error::Rpc { code, message }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Error::AuthorizationRejected(_) => FailureKind::AuthorizationRejected,
            _ => FailureKind::TransportOrCallFailure,
        }
    }

    /// EIP-1193 error code, when the failure came from the wallet
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Error::AuthorizationRejected(_) => Some(USER_REJECTED_CODE),
            Error::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
