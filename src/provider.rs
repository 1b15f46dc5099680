//! Provider and signer handles
//!
//! Both are capability objects over one shared wallet transport. They hold no
//! mutable state and are created fresh for every gateway call.

use crate::wallet::{methods, Eip1193};
use crate::{Error, Result};
use alloy::primitives::{hex, Address, Signature, B256};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

/// Handle to a wallet whose accounts the user has authorized
pub struct BrowserProvider {
    transport: Arc<dyn Eip1193>,
    accounts: Vec<Address>,
}

impl BrowserProvider {
    /// Ask the wallet for account access (`eth_requestAccounts`)
    ///
    /// May open a wallet prompt. An empty account list counts as a rejection.
    pub async fn connect(transport: Arc<dyn Eip1193>) -> Result<Self> {
        let raw = transport
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await?;
        let accounts: Vec<Address> = serde_json::from_value(raw).map_err(|e| {
            Error::InvalidResponse(format!("{}: {}", methods::REQUEST_ACCOUNTS, e))
        })?;

        if accounts.is_empty() {
            return Err(Error::AuthorizationRejected(
                "wallet returned no authorized accounts".to_string(),
            ));
        }

        tracing::debug!(accounts = accounts.len(), "Wallet authorized");
        Ok(Self {
            transport,
            accounts,
        })
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// The raw wallet transport
    pub fn transport(&self) -> &Arc<dyn Eip1193> {
        &self.transport
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.transport.request(method, params).await
    }

    /// Send a request and deserialize the result
    pub async fn request_as<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let raw = self.request(method, params).await?;
        serde_json::from_value(raw).map_err(|e| Error::InvalidResponse(format!("{}: {}", method, e)))
    }

    /// Chain id exactly as the wallet reports it (e.g. `"0x4"`)
    pub async fn chain_id(&self) -> Result<String> {
        self.request_as(methods::CHAIN_ID, json!([])).await
    }

    /// Bind a signer to the active (first authorized) account
    pub fn into_signer(self) -> Result<WalletSigner> {
        let address = *self.accounts.first().ok_or_else(|| {
            Error::AuthorizationRejected("wallet returned no authorized accounts".to_string())
        })?;
        Ok(WalletSigner {
            provider: self,
            address,
        })
    }
}

impl std::fmt::Debug for BrowserProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserProvider")
            .field("accounts", &self.accounts)
            .finish_non_exhaustive()
    }
}

/// Signer bound to one authorized account
#[derive(Debug)]
pub struct WalletSigner {
    provider: BrowserProvider,
    address: Address,
}

impl WalletSigner {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &BrowserProvider {
        &self.provider
    }

    /// EIP-191 `personal_sign` over a UTF-8 message
    pub async fn sign_message(&self, message: &str) -> Result<SignedMessage> {
        let params = json!([format!("0x{}", hex::encode(message)), self.address]);
        let signature: String = self
            .provider
            .request_as(methods::PERSONAL_SIGN, params)
            .await?;

        let is_hex = signature
            .strip_prefix("0x")
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()));
        if !is_hex {
            return Err(Error::InvalidResponse(format!(
                "{}: signature is not 0x-prefixed hex",
                methods::PERSONAL_SIGN
            )));
        }

        tracing::info!(address = %self.address, "Message signed");
        Ok(SignedMessage {
            message: message.to_string(),
            address: self.address,
            signature,
        })
    }

    /// Ask the wallet to sign and submit a transaction from this account
    pub async fn send_transaction(&self, mut tx: Value) -> Result<B256> {
        if let Value::Object(fields) = &mut tx {
            fields.insert("from".to_string(), json!(self.address));
        }
        self.provider
            .request_as(methods::SEND_TRANSACTION, json!([tx]))
            .await
    }
}

/// A message and the signature the wallet produced for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedMessage {
    pub message: String,
    pub address: Address,
    /// 0x-prefixed hex, 65 bytes for ECDSA wallets
    pub signature: String,
}

impl SignedMessage {
    /// Recover the address that produced the signature
    pub fn recover(&self) -> Result<Address> {
        Signature::from_str(&self.signature)
            .map_err(|e| Error::Signing(format!("Invalid signature: {}", e)))?
            .recover_address_from_msg(self.message.as_bytes())
            .map_err(|e| Error::Signing(format!("Recovery failed: {}", e)))
    }

    /// Whether the signature was produced by the account it claims
    pub fn verify(&self) -> bool {
        self.recover().is_ok_and(|recovered| recovered == self.address)
    }
}

/// What the wallet exposes about itself, plus the transport to reach it
///
/// Nothing here is validated: the strings are what the wallet reported. The
/// transport can be handed to any JSON-RPC consumer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderData {
    pub selected_address: Option<Address>,
    pub chain_id: Option<String>,
    #[serde(skip)]
    transport: Arc<dyn Eip1193>,
}

impl ProviderData {
    /// Snapshot an authorized provider
    pub async fn from_provider(provider: BrowserProvider) -> Result<Self> {
        let chain_id = provider.chain_id().await?;
        Ok(Self {
            selected_address: provider.accounts().first().copied(),
            chain_id: Some(chain_id),
            transport: Arc::clone(provider.transport()),
        })
    }

    pub fn transport(&self) -> Arc<dyn Eip1193> {
        Arc::clone(&self.transport)
    }

    /// The chain id as a number, when the wallet reported a hex quantity
    pub fn chain_id_number(&self) -> Option<u64> {
        let digits = self.chain_id.as_deref()?.strip_prefix("0x")?;
        u64::from_str_radix(digits, 16).ok()
    }
}

impl std::fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderData")
            .field("selected_address", &self.selected_address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
