//! JSON-RPC over HTTP wallet backend

use super::{transport_error, Eip1193};
use crate::{Error, Result};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use url::Url;

/// Wallet reached through a JSON-RPC HTTP endpoint
pub struct HttpWallet {
    url: Url,
    provider: DynProvider,
}

impl HttpWallet {
    pub fn new(url: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        Self { url, provider }
    }

    /// Create from a URL string
    pub fn from_url(url: &str) -> Result<Self> {
        let url: Url = url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid wallet URL '{}': {}", url, e)))?;
        Ok(Self::new(url))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl std::fmt::Debug for HttpWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWallet")
            .field("url", &self.url.as_str())
            .finish()
    }
}

#[async_trait]
impl Eip1193 for HttpWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        tracing::debug!(method, url = %self.url, "Sending wallet request");

        self.provider
            .raw_request::<Value, Value>(Cow::Owned(method.to_string()), params)
            .await
            .map_err(|e| {
                let err = transport_error(e);
                tracing::debug!(method, error = %err, "Wallet request failed");
                err
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::methods;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one JSON-RPC request, answering with `reply` under the request's id.
    /// Resolves to the request body that was received.
    async fn serve_once(reply: Value) -> (Url, tokio::task::JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let body = loop {
                let mut chunk = [0u8; 4096];
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before full request");
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf);
                let Some(split) = text.find("\r\n\r\n") else {
                    continue;
                };
                let length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + length {
                    break buf[split + 4..split + 4 + length].to_vec();
                }
            };

            let request: Value = serde_json::from_slice(&body).unwrap();
            let mut response = reply;
            response["jsonrpc"] = json!("2.0");
            response["id"] = request["id"].clone();
            let payload = response.to_string();
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                payload.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(payload.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (url, handle)
    }

    #[tokio::test]
    async fn request_returns_result() {
        let (url, server) = serve_once(json!({"result": "0x4"})).await;
        let wallet = HttpWallet::new(url);

        let chain = wallet.request(methods::CHAIN_ID, json!([])).await.unwrap();
        assert_eq!(chain, "0x4");

        let sent = server.await.unwrap();
        assert_eq!(sent["method"], methods::CHAIN_ID);
        assert_eq!(sent["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn user_rejection_through_request_is_authorization_rejected() {
        let (url, server) = serve_once(json!({
            "error": {"code": 4001, "message": "User rejected the request."}
        }))
        .await;
        let wallet = HttpWallet::new(url);

        let err = wallet
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthorizationRejected(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn other_wallet_errors_keep_their_code() {
        let (url, server) = serve_once(json!({
            "error": {"code": 4902, "message": "Unrecognized chain ID"}
        }))
        .await;
        let wallet = HttpWallet::new(url);

        let err = wallet
            .request(methods::SWITCH_CHAIN, json!([{"chainId": "0x89"}]))
            .await
            .unwrap_err();
        assert_eq!(err.rpc_code(), Some(4902));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();
        drop(listener);

        let err = HttpWallet::new(url)
            .request(methods::CHAIN_ID, json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = HttpWallet::from_url("not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
