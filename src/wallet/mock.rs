//! Scripted in-memory wallet for tests

use super::{codes, methods, Eip1193};
use crate::{Error, Result};
use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// Signature returned for `personal_sign` unless a response is scripted
pub(crate) const MOCK_SIGNATURE: &str =
    "0xabababababababababababababababababababababababababababababababababababababababababababababababababababababababababababababababab1b";

pub(crate) struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    chain_id: Mutex<u64>,
    known_chains: Vec<u64>,
    rejected: Mutex<HashSet<String>>,
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockWallet {
    pub(crate) fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            chain_id: Mutex::new(chain_id),
            known_chains: vec![1, 4, 5, 11155111],
            rejected: Mutex::new(HashSet::new()),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Drop every authorized account, as if the user disconnected the site
    pub(crate) fn revoke(&self) {
        self.accounts.lock().unwrap().clear();
    }

    /// Answer `method` with a 4001 user rejection
    pub(crate) fn reject(&self, method: &str) {
        self.rejected.lock().unwrap().insert(method.to_string());
    }

    /// Queue a response for `method`; the last queued value repeats
    pub(crate) fn respond(&self, method: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(value);
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }

    pub(crate) fn chain_id(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }

    fn scripted(&self, method: &str) -> Option<Value> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(method)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Eip1193 for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        if self.rejected.lock().unwrap().contains(method) {
            return Err(Error::from_rpc(
                codes::USER_REJECTED,
                "User rejected the request.",
            ));
        }
        if let Some(value) = self.scripted(method) {
            return Ok(value);
        }

        match method {
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => {
                Ok(serde_json::to_value(&*self.accounts.lock().unwrap())?)
            }
            methods::CHAIN_ID => Ok(json!(format!("{:#x}", self.chain_id()))),
            methods::PERSONAL_SIGN => Ok(json!(MOCK_SIGNATURE)),
            methods::SWITCH_CHAIN => {
                let requested = params[0]["chainId"].as_str().unwrap_or_default();
                let chain_id = u64::from_str_radix(requested.trim_start_matches("0x"), 16)
                    .map_err(|_| Error::from_rpc(codes::INVALID_PARAMS, "bad chainId"))?;
                if !self.known_chains.contains(&chain_id) {
                    return Err(Error::from_rpc(
                        codes::UNRECOGNIZED_CHAIN,
                        format!("Unrecognized chain ID {requested}"),
                    ));
                }
                *self.chain_id.lock().unwrap() = chain_id;
                Ok(Value::Null)
            }
            _ => Err(Error::from_rpc(
                codes::UNSUPPORTED_METHOD,
                format!("{method} not scripted"),
            )),
        }
    }
}
