//! RPC endpoint configuration
//!
//! Used by the local wallet backend to reach a node for each chain it can
//! switch to. Supports multiple configuration methods following Ethereum
//! ecosystem conventions:
//! 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (INFURA_API_KEY, ALCHEMY_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - for testing only
//!
//! # Examples
//!
//! ```bash
//! # Option 1: Per-chain URLs (recommended)
//! export RINKEBY_RPC_URL="https://rinkeby.infura.io/v3/YOUR_KEY"
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//!
//! # Option 2: Single provider API key
//! export INFURA_API_KEY="YOUR_KEY"
//!
//! # Option 3: No env vars - uses public RPCs (rate limited, for testing only)
//! ```

use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Debug, Clone, Default)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// Chain ID constants
pub mod chains {
    pub const MAINNET: u64 = 1;
    pub const RINKEBY: u64 = 4;
    pub const GOERLI: u64 = 5;
    pub const SEPOLIA: u64 = 11155111;
}

/// Environment variable names
pub mod env_vars {
    // Per-chain URLs (highest priority)
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const RINKEBY_RPC_URL: &str = "RINKEBY_RPC_URL";
    pub const GOERLI_RPC_URL: &str = "GOERLI_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";

    // Provider API keys
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const MAINNET: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://rpc.sepolia.org";
}

impl RpcConfig {
    /// Create RPC config from environment variables
    ///
    /// Priority:
    /// 1. Per-chain env vars (ETH_RPC_URL, RINKEBY_RPC_URL, etc.)
    /// 2. INFURA_API_KEY - builds URLs for all chains
    /// 3. ALCHEMY_API_KEY - builds URLs for supported chains
    /// 4. Public RPC fallbacks (for testing only)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same resolution as [`RpcConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut urls = HashMap::new();

        // Priority 1: Check per-chain env vars
        let per_chain = [
            (env_vars::ETH_RPC_URL, chains::MAINNET),
            (env_vars::RINKEBY_RPC_URL, chains::RINKEBY),
            (env_vars::GOERLI_RPC_URL, chains::GOERLI),
            (env_vars::SEPOLIA_RPC_URL, chains::SEPOLIA),
        ];
        for (var, chain_id) in per_chain {
            if let Some(url) = lookup(var) {
                tracing::debug!(chain_id, "Using {} for RPC", var);
                urls.insert(chain_id, url);
            }
        }

        // Priority 2: If no per-chain vars, try INFURA_API_KEY
        if urls.is_empty() {
            if let Some(key) = lookup(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                urls.insert(
                    chains::MAINNET,
                    format!("https://mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::RINKEBY,
                    format!("https://rinkeby.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::GOERLI,
                    format!("https://goerli.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://sepolia.infura.io/v3/{}", key),
                );
            }
        }

        // Priority 3: If no Infura, try ALCHEMY_API_KEY
        if urls.is_empty() {
            if let Some(key) = lookup(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                urls.insert(
                    chains::MAINNET,
                    format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://eth-sepolia.g.alchemy.com/v2/{}", key),
                );
                // Note: Alchemy no longer serves Rinkeby or Goerli
            }
        }

        // Priority 4: Fall back to public RPCs for any missing chains
        if !urls.contains_key(&chains::MAINNET) {
            tracing::warn!("No RPC configured for mainnet, using public RPC (rate limited)");
        }
        urls.entry(chains::MAINNET)
            .or_insert_with(|| public_rpcs::MAINNET.to_string());
        urls.entry(chains::SEPOLIA)
            .or_insert_with(|| public_rpcs::SEPOLIA.to_string());

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Add or replace the URL for one chain
    pub fn insert(&mut self, chain_id: u64, url: impl Into<String>) {
        self.urls.insert(chain_id, url.into());
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Get all configured chain IDs
    pub fn chains(&self) -> impl Iterator<Item = &u64> {
        self.urls.keys()
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}
