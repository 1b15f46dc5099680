//! Wallet Gateway
//!
//! A thin layer between an application and a user's wallet. It exposes:
//! - Account authorization and provider/signer handles
//! - EIP-191 message signing
//! - Network switching with an explicit outcome
//! - ERC-20 transfers with validated fixed-point amounts
//!
//! # Security Model
//!
//! - The gateway never holds key material; it only speaks EIP-1193 to a wallet
//! - The bundled local wallet keeps its private key inside the `wallet` module
//! - Amounts and addresses are validated before anything reaches the wallet

pub mod amount;
pub mod chain;
pub mod config;
pub mod erc20;
pub mod gateway;
pub mod helpers;
pub mod provider;
pub mod receipt;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use amount::{AmountError, TokenAmount};
pub use chain::{ChainSwitch, Network};
pub use config::{Config, ReceiptPolling, RpcConfig, DEFAULT_MESSAGE};
pub use erc20::{Erc20Information, TransferRequest};
pub use error::{Error, FailureKind, Result};
pub use gateway::WalletGateway;
pub use provider::{BrowserProvider, ProviderData, SignedMessage, WalletSigner};
pub use receipt::ReceiptSummary;
pub use wallet::{Eip1193, HttpWallet, LocalWallet};
