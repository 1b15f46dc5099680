//! Known networks and chain-switch outcomes

use crate::config::rpc::chains;
use serde::Serialize;
use std::fmt;

/// Networks the gateway knows by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Rinkeby,
    Goerli,
    Sepolia,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Mainnet,
        Network::Rinkeby,
        Network::Goerli,
        Network::Sepolia,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => chains::MAINNET,
            Network::Rinkeby => chains::RINKEBY,
            Network::Goerli => chains::GOERLI,
            Network::Sepolia => chains::SEPOLIA,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mainnet" | "ethereum" => Some(Network::Mainnet),
            "rinkeby" => Some(Network::Rinkeby),
            "goerli" => Some(Network::Goerli),
            "sepolia" => Some(Network::Sepolia),
            _ => None,
        }
    }

    /// Block explorer root
    pub fn explorer_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://etherscan.io",
            Network::Rinkeby => "https://rinkeby.etherscan.io",
            Network::Goerli => "https://goerli.etherscan.io",
            Network::Sepolia => "https://sepolia.etherscan.io",
        }
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url(), tx_hash)
    }

    pub fn token_url(&self, token_address: &str) -> String {
        format!("{}/token/{}", self.explorer_url(), token_address)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a chain given by name ("rinkeby") or by id, decimal or `0x` hex
pub fn parse_chain(value: &str) -> Option<u64> {
    if let Some(network) = Network::from_name(value) {
        return Some(network.chain_id());
    }
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

/// Result of asking the wallet to change its active network
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChainSwitch {
    /// The wallet accepted the switch
    Switched { chain_id: u64 },
    /// The wallet refused or the request failed
    Failed {
        chain_id: u64,
        /// EIP-1193 error code, when the wallet supplied one
        code: Option<i64>,
        reason: String,
    },
}

impl ChainSwitch {
    pub fn is_switched(&self) -> bool {
        matches!(self, ChainSwitch::Switched { .. })
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            ChainSwitch::Switched { chain_id } | ChainSwitch::Failed { chain_id, .. } => *chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_round_trips_through_chain_id() {
        for network in Network::ALL {
            assert_eq!(Network::from_chain_id(network.chain_id()), Some(network));
            assert_eq!(Network::from_name(network.name()), Some(network));
        }
        assert_eq!(Network::from_chain_id(137), None);
    }

    #[test]
    fn explorer_links() {
        assert_eq!(
            Network::Rinkeby.tx_url("0xabc"),
            "https://rinkeby.etherscan.io/tx/0xabc"
        );
        assert_eq!(
            Network::Mainnet.token_url("0xdef"),
            "https://etherscan.io/token/0xdef"
        );
    }

    #[test]
    fn parse_chain_accepts_names_and_ids() {
        assert_eq!(parse_chain("Rinkeby"), Some(4));
        assert_eq!(parse_chain("0x4"), Some(4));
        assert_eq!(parse_chain("11155111"), Some(11155111));
        assert_eq!(parse_chain("polygon"), None);
    }

    #[test]
    fn chain_switch_serializes_with_outcome_tag() {
        let failed = ChainSwitch::Failed {
            chain_id: 4,
            code: Some(4001),
            reason: "User rejected".to_string(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["code"], 4001);
        assert!(!failed.is_switched());
        assert_eq!(failed.chain_id(), 4);
    }
}
