//! Minimal ERC-20 bindings
//!
//! Only what the gateway needs: `transfer` for sending, plus the `symbol`,
//! `decimals` and `balanceOf` views used to describe a token.

use crate::amount::TokenAmount;
use crate::wallet::{methods, Eip1193};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

sol! {
    interface IERC20 {
        function transfer(address recipient, uint256 amount) external returns (bool);
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// Token metadata plus the balance of one holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Erc20Information {
    pub token: Address,
    pub symbol: String,
    pub decimals: u8,
    pub balance: TokenAmount,
}

/// A validated ERC-20 transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRequest {
    pub token: Address,
    pub recipient: Address,
    pub amount: TokenAmount,
}

impl TransferRequest {
    pub fn new(token: Address, recipient: Address, amount: TokenAmount) -> Self {
        Self {
            token,
            recipient,
            amount,
        }
    }

    /// Build a request from user input
    ///
    /// Every field is validated here, so a malformed request never reaches
    /// the wallet.
    pub fn parse(token: &str, recipient: &str, amount: &str, decimals: u8) -> Result<Self> {
        let token = parse_address(token, "token")?;
        let recipient = parse_address(recipient, "recipient")?;
        let amount = TokenAmount::parse(amount, decimals)?;
        Ok(Self::new(token, recipient, amount))
    }

    /// ABI-encoded `transfer(recipient, amount)` call
    pub fn calldata(&self) -> Bytes {
        IERC20::transferCall {
            recipient: self.recipient,
            amount: self.amount.base_units(),
        }
        .abi_encode()
        .into()
    }

    /// Transaction object for `eth_sendTransaction`, without `from`
    pub fn to_transaction(&self) -> Value {
        json!({
            "to": self.token,
            "data": self.calldata(),
        })
    }
}

pub(crate) fn parse_address(value: &str, field: &str) -> Result<Address> {
    Address::from_str(value).map_err(|e| Error::InvalidAddress(format!("{}: {}", field, e)))
}

/// Run a view call against `token` through the wallet's `eth_call`
async fn view<C: SolCall>(wallet: &dyn Eip1193, token: Address, call: C) -> Result<C::Return> {
    let data = Bytes::from(call.abi_encode());
    let raw = wallet
        .request(methods::CALL, json!([{"to": token, "data": data}, "latest"]))
        .await?;
    let output: Bytes = serde_json::from_value(raw)
        .map_err(|e| Error::InvalidResponse(format!("{}: {}", methods::CALL, e)))?;

    C::abi_decode_returns(&output).map_err(|e| {
        Error::InvalidResponse(format!("{} returned undecodable data: {}", C::SIGNATURE, e))
    })
}

/// Read symbol, decimals and `owner`'s balance of `token`
pub async fn fetch_information(
    wallet: &dyn Eip1193,
    token: Address,
    owner: Address,
) -> Result<Erc20Information> {
    let symbol = view(wallet, token, IERC20::symbolCall {}).await?;
    let decimals = view(wallet, token, IERC20::decimalsCall {}).await?;
    let balance: U256 = view(wallet, token, IERC20::balanceOfCall { owner }).await?;

    tracing::debug!(token = %token, symbol = %symbol, decimals, "Fetched ERC-20 information");
    Ok(Erc20Information {
        token,
        symbol,
        decimals,
        balance: TokenAmount::from_base_units(balance, decimals),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::AmountError;
    use crate::wallet::mock::MockWallet;
    use alloy::primitives::{address, hex};
    use alloy::sol_types::SolValue;

    const TOKEN: Address = address!("c7ad46e0b8a400bb3c915120d284aafba8fc4735");
    const RECIPIENT: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

    #[test]
    fn transfer_calldata_layout() {
        let request = TransferRequest::new(
            TOKEN,
            RECIPIENT,
            TokenAmount::parse("10.5", 18).unwrap(),
        );
        let data = request.calldata();

        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &hex!("a9059cbb"));
        assert_eq!(&data[16..36], RECIPIENT.as_slice());
        assert_eq!(
            U256::from_be_slice(&data[36..68]),
            U256::from(10_500_000_000_000_000_000u128)
        );
    }

    #[test]
    fn parse_validates_every_field() {
        let bad_amount = TransferRequest::parse(
            "0xc7AD46e0b8a400Bb3C915120d284AafbA8fc4735",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "abc",
            18,
        )
        .unwrap_err();
        assert!(matches!(
            bad_amount,
            Error::Amount(AmountError::Malformed(_))
        ));

        let bad_recipient = TransferRequest::parse(
            "0xc7AD46e0b8a400Bb3C915120d284AafbA8fc4735",
            "0xRECIPIENT",
            "1",
            18,
        )
        .unwrap_err();
        assert!(matches!(bad_recipient, Error::InvalidAddress(_)));
    }

    #[test]
    fn transaction_object_targets_token() {
        let request = TransferRequest::new(TOKEN, RECIPIENT, TokenAmount::parse("1", 6).unwrap());
        let tx = request.to_transaction();
        let to: Address = serde_json::from_value(tx["to"].clone()).unwrap();
        assert_eq!(to, TOKEN);
        assert!(tx["data"].as_str().unwrap().starts_with("0xa9059cbb"));
        assert!(tx.get("from").is_none());
    }

    #[tokio::test]
    async fn fetch_information_decodes_views() {
        let wallet = MockWallet::new(vec![RECIPIENT], 4);
        let symbol = Bytes::from(("rDAI".to_string(),).abi_encode_params());
        let decimals = Bytes::from((U256::from(18u8),).abi_encode_params());
        let balance = Bytes::from((U256::from(2_500_000_000_000_000_000u128),).abi_encode_params());
        wallet.respond(methods::CALL, json!(symbol));
        wallet.respond(methods::CALL, json!(decimals));
        wallet.respond(methods::CALL, json!(balance));

        let info = fetch_information(&wallet, TOKEN, RECIPIENT).await.unwrap();
        assert_eq!(info.symbol, "rDAI");
        assert_eq!(info.decimals, 18);
        assert_eq!(info.balance.to_string(), "2.5");

        let calls = wallet.calls_to(methods::CALL);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2][1], "latest");
    }

    #[tokio::test]
    async fn undecodable_output_is_invalid_response() {
        let wallet = MockWallet::new(vec![RECIPIENT], 4);
        wallet.respond(methods::CALL, json!("0x"));
        let err = fetch_information(&wallet, TOKEN, RECIPIENT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
