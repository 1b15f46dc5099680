//! Wallet gateway
//!
//! The public surface of the crate. Every operation is independent: each
//! call asks the wallet for a fresh provider (and signer) instead of caching
//! one, so revoking access between two calls is always observed.
//!
//! Failures propagate to the caller, except for chain switching, which
//! reports a [`ChainSwitch`] outcome instead.

use crate::amount::TokenAmount;
use crate::chain::{ChainSwitch, Network};
use crate::config::{ReceiptPolling, DEFAULT_MESSAGE};
use crate::erc20::{self, parse_address, Erc20Information, TransferRequest};
use crate::provider::{BrowserProvider, ProviderData, SignedMessage, WalletSigner};
use crate::receipt::{self, ReceiptSummary};
use crate::wallet::{methods, Eip1193};
use crate::{Error, Result};
use alloy::primitives::{Address, B256, U256};
use serde_json::json;
use std::sync::Arc;

/// Entry point for wallet operations
pub struct WalletGateway {
    /// The injected wallet, if any
    wallet: Option<Arc<dyn Eip1193>>,
    receipt_polling: ReceiptPolling,
}

impl WalletGateway {
    /// Create a gateway over a wallet; `None` means no wallet is available
    pub fn new(wallet: Option<Arc<dyn Eip1193>>) -> Self {
        Self {
            wallet,
            receipt_polling: ReceiptPolling::default(),
        }
    }

    pub fn with_wallet(wallet: Arc<dyn Eip1193>) -> Self {
        Self::new(Some(wallet))
    }

    pub fn with_receipt_polling(mut self, polling: ReceiptPolling) -> Self {
        self.receipt_polling = polling;
        self
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    fn transport(&self) -> Result<Arc<dyn Eip1193>> {
        self.wallet.clone().ok_or(Error::WalletUnavailable)
    }

    /// Request account access and return a provider handle
    pub async fn get_provider(&self) -> Result<BrowserProvider> {
        BrowserProvider::connect(self.transport()?).await
    }

    /// Provider handle bound to the first authorized account
    pub async fn get_signer(&self) -> Result<WalletSigner> {
        self.get_provider().await?.into_signer()
    }

    /// Raw wallet details plus its transport, for use by other JSON-RPC clients
    pub async fn get_provider_data(&self) -> Result<ProviderData> {
        let provider = self.get_provider().await?;
        ProviderData::from_provider(provider).await
    }

    /// Sign `message` with the active account (EIP-191 `personal_sign`)
    pub async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        let signer = self.get_signer().await?;
        signer.sign_message(message).await
    }

    /// Sign the default "Hello World" message
    pub async fn sign_default_message(&self) -> Result<SignedMessage> {
        self.sign_message(DEFAULT_MESSAGE).await
    }

    /// Ask the wallet to switch to `chain_id`
    ///
    /// Never fails: a refusal or error is reported as [`ChainSwitch::Failed`]
    /// and logged.
    pub async fn set_chain(&self, chain_id: u64) -> ChainSwitch {
        match self.request_chain_switch(chain_id).await {
            Ok(()) => {
                tracing::info!(chain_id, "Wallet switched chain");
                ChainSwitch::Switched { chain_id }
            }
            Err(e) => {
                tracing::warn!(chain_id, error = %e, "Error during chain change");
                ChainSwitch::Failed {
                    chain_id,
                    code: e.rpc_code(),
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn request_chain_switch(&self, chain_id: u64) -> Result<()> {
        let params = json!([{ "chainId": format!("{:#x}", chain_id) }]);
        self.transport()?
            .request(methods::SWITCH_CHAIN, params)
            .await?;
        Ok(())
    }

    /// Switch the wallet to Rinkeby (chain 4)
    pub async fn set_rinkeby(&self) -> ChainSwitch {
        self.set_chain(Network::Rinkeby.chain_id()).await
    }

    /// Send an ERC-20 `transfer` from the active account
    ///
    /// Returns the transaction hash as soon as the wallet submits it.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<B256> {
        let signer = self.get_signer().await?;
        tracing::info!(
            from = %signer.address(),
            token = %request.token,
            recipient = %request.recipient,
            amount = %request.amount,
            "Submitting ERC-20 transfer"
        );

        let tx_hash = signer.send_transaction(request.to_transaction()).await?;
        tracing::info!(tx_hash = %tx_hash, "Transfer submitted");
        Ok(tx_hash)
    }

    /// Transfer from user input, reading the token's decimals when not given
    ///
    /// Addresses and amount syntax are checked before the wallet is contacted.
    /// Precision is checked once the decimals are known.
    pub async fn transfer_from_input(
        &self,
        token: &str,
        recipient: &str,
        amount: &str,
        decimals: Option<u8>,
    ) -> Result<B256> {
        let token_address = parse_address(token, "token")?;
        parse_address(recipient, "recipient")?;
        TokenAmount::check_syntax(amount)?;

        let decimals = match decimals {
            Some(decimals) => decimals,
            None => {
                let owner = self.get_signer().await?.address();
                let info = self.erc20_information(token_address, owner).await?;
                tracing::info!(
                    symbol = %info.symbol,
                    decimals = info.decimals,
                    balance = %info.balance,
                    "Token found"
                );
                info.decimals
            }
        };

        let request = TransferRequest::parse(token, recipient, amount, decimals)?;
        self.transfer(&request).await
    }

    /// Native balance of `address` at the latest block
    pub async fn native_balance(&self, address: Address) -> Result<U256> {
        let raw = self
            .transport()?
            .request(methods::GET_BALANCE, json!([address, "latest"]))
            .await?;
        serde_json::from_value(raw)
            .map_err(|e| Error::InvalidResponse(format!("{}: {}", methods::GET_BALANCE, e)))
    }

    /// Symbol, decimals and `owner`'s balance of an ERC-20 token
    pub async fn erc20_information(&self, token: Address, owner: Address) -> Result<Erc20Information> {
        let wallet = self.transport()?;
        erc20::fetch_information(wallet.as_ref(), token, owner).await
    }

    /// Poll for the receipt of a submitted transaction
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ReceiptSummary> {
        let wallet = self.transport()?;
        receipt::wait_for_receipt(wallet.as_ref(), tx_hash, &self.receipt_polling).await
    }
}

impl std::fmt::Debug for WalletGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletGateway")
            .field("has_wallet", &self.has_wallet())
            .field("receipt_polling", &self.receipt_polling)
            .finish()
    }
}
