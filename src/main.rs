//! Wallet Gateway CLI
//!
//! Command-line access to the gateway operations.

use alloy::primitives::{Address, B256};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wallet_gateway::chain::parse_chain;
use wallet_gateway::config::PRIVATE_KEY_ENV;
use wallet_gateway::helpers::short_address;
use wallet_gateway::{
    ChainSwitch, Config, Eip1193, Error, HttpWallet, LocalWallet, Network, Result, RpcConfig,
    TokenAmount, WalletGateway,
};

#[derive(Parser)]
#[command(name = "wallet-gateway")]
#[command(about = "Talk to an EIP-1193 wallet: authorize, sign, switch chains, transfer tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Wallet backend
    #[arg(short, long, global = true, value_enum, default_value_t = Backend::Local)]
    backend: Backend,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    /// Private key from PRIVATE_KEY, RPC endpoints from the environment
    ///
    /// Rinkeby (the default chain) needs RINKEBY_RPC_URL or INFURA_API_KEY.
    Local,
    /// JSON-RPC wallet bridge at WALLET_RPC_URL
    Http,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize and show the selected account and chain
    Accounts,

    /// Sign a message with the active account
    Sign {
        /// Message to sign (defaults to the configured message)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Ask the wallet to switch networks
    SwitchChain {
        /// Network name or chain id (decimal or 0x hex)
        #[arg(long, default_value = "rinkeby")]
        chain: String,
    },

    /// Transfer ERC-20 tokens from the active account
    Transfer {
        /// Token contract address
        #[arg(long)]
        token: String,

        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in token units, e.g. 10.5
        #[arg(long)]
        amount: String,

        /// Token decimals (read from the contract if omitted)
        #[arg(long)]
        decimals: Option<u8>,

        /// Wait for the transaction receipt
        #[arg(long)]
        wait: bool,
    },

    /// Show native or ERC-20 balance
    Balance {
        /// ERC-20 token address (native balance if omitted)
        #[arg(long)]
        token: Option<String>,

        /// Account to query (defaults to the active account)
        #[arg(long)]
        address: Option<String>,
    },

    /// Wait for a transaction receipt
    Receipt {
        /// Transaction hash
        hash: String,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Load config
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let gateway = WalletGateway::new(connect_wallet(cli.backend, &config))
        .with_receipt_polling(config.receipt);

    match cli.command {
        Commands::Accounts => run_accounts(&gateway).await?,
        Commands::Sign { message } => {
            let message = message.unwrap_or_else(|| config.default_message.clone());
            run_sign(&gateway, &message).await?;
        }
        Commands::SwitchChain { chain } => run_switch_chain(&gateway, &chain).await?,
        Commands::Transfer {
            token,
            to,
            amount,
            decimals,
            wait,
        } => run_transfer(&gateway, &token, &to, &amount, decimals, wait).await?,
        Commands::Balance { token, address } => {
            run_balance(&gateway, token.as_deref(), address.as_deref()).await?
        }
        Commands::Receipt { hash } => {
            let tx_hash = B256::from_str(&hash)
                .map_err(|e| Error::InvalidArgument(format!("Invalid transaction hash: {}", e)))?;
            print_json(&gateway.wait_for_receipt(tx_hash).await?)?;
        }
        Commands::Config => print_json(&config)?,
    }

    Ok(())
}

/// Build the selected wallet backend; `None` when it is not configured
fn connect_wallet(backend: Backend, config: &Config) -> Option<Arc<dyn Eip1193>> {
    match backend {
        Backend::Local => {
            let rpc = RpcConfig::from_env();
            match LocalWallet::from_env(PRIVATE_KEY_ENV, rpc, config.chain_id) {
                Ok(wallet) => Some(Arc::new(wallet)),
                Err(e) => {
                    tracing::warn!(error = %e, "No local wallet available");
                    None
                }
            }
        }
        Backend::Http => {
            let Some(url) = config.wallet_rpc_url() else {
                tracing::warn!("No wallet_rpc_url configured - no wallet available");
                return None;
            };
            match HttpWallet::from_url(&url) {
                Ok(wallet) => Some(Arc::new(wallet)),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to configure HTTP wallet");
                    None
                }
            }
        }
    }
}

async fn run_accounts(gateway: &WalletGateway) -> Result<()> {
    let data = gateway.get_provider_data().await?;
    if let Some(address) = data.selected_address {
        tracing::info!(address = %short_address(&address.to_checksum(None)), "Connected");
    }
    if let Some(network) = data.chain_id_number().and_then(Network::from_chain_id) {
        tracing::info!(network = %network, "Active network");
    }
    print_json(&data)
}

async fn run_sign(gateway: &WalletGateway, message: &str) -> Result<()> {
    let signed = gateway.sign_message(message).await?;
    if !signed.verify() {
        tracing::warn!(address = %signed.address, "Signature does not recover to the signing account");
    }
    print_json(&signed)
}

async fn run_switch_chain(gateway: &WalletGateway, chain: &str) -> Result<()> {
    let chain_id = parse_chain(chain)
        .ok_or_else(|| Error::InvalidArgument(format!("Unknown network: {}", chain)))?;

    let outcome = gateway.set_chain(chain_id).await;
    print_json(&outcome)?;
    if let ChainSwitch::Failed { reason, .. } = outcome {
        println!("Chain switch FAILED: {}", reason);
    }
    Ok(())
}

async fn run_transfer(
    gateway: &WalletGateway,
    token: &str,
    to: &str,
    amount: &str,
    decimals: Option<u8>,
    wait: bool,
) -> Result<()> {
    let tx_hash = gateway
        .transfer_from_input(token, to, amount, decimals)
        .await?;
    let tx_hash_str = format!("{:#x}", tx_hash);

    println!("Tx: {}", tx_hash_str);
    if let Some(network) = current_network(gateway).await {
        println!("  {}", network.tx_url(&tx_hash_str));
    }

    if wait {
        let receipt = gateway.wait_for_receipt(tx_hash).await?;
        println!("  {}", if receipt.status { "Success" } else { "Error" });
    } else {
        println!("  Awaiting confirmation");
    }
    Ok(())
}

async fn run_balance(gateway: &WalletGateway, token: Option<&str>, address: Option<&str>) -> Result<()> {
    let owner = match address {
        Some(raw) => raw
            .parse::<Address>()
            .map_err(|e| Error::InvalidAddress(format!("{}: {}", raw, e)))?,
        None => gateway.get_signer().await?.address(),
    };

    match token {
        Some(raw) => {
            let token: Address = raw
                .parse()
                .map_err(|e| Error::InvalidAddress(format!("token: {}", e)))?;
            let info = gateway.erc20_information(token, owner).await?;
            println!("{} {}", info.balance, info.symbol);
        }
        None => {
            let balance = gateway.native_balance(owner).await?;
            println!("{} ETH", TokenAmount::from_base_units(balance, 18));
        }
    }
    Ok(())
}

async fn current_network(gateway: &WalletGateway) -> Option<Network> {
    let data = gateway.get_provider_data().await.ok()?;
    data.chain_id_number().and_then(Network::from_chain_id)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
