//! chainnft CLI — query aggregated NFT metadata from the terminal.
//!
//! Usage:
//! ```bash
//! # List NFTs held by a wallet
//! chainnft owned --chain ethereum --owner 0x2488f090656BddB63fe3Bdb506D0D109AaaD93Bb
//!
//! # Fetch one token, bypassing the cache
//! chainnft token --chain klaytn --contract 0x590744cb8cf1a698d7db509b52bf209e3cccb8e0 --id 0x1 --resync
//!
//! # Dereference a content URI directly
//! chainnft resolve --uri ipfs://QmPCzRHRgCdPrhNnfG9tPvM5jp18TmoJwBrfkgcyFipe7b/610.gif
//!
//! # List wired networks
//! chainnft chains
//! ```
//!
//! Provider credentials come from the environment (see `AppConfig`); records
//! are cached under `CHAINNFT_DATA_DIR` (default `.data`).

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use chainnft_core::{AppConfig, Chain, MetadataStore};
use chainnft_engine::{ChainEngine, NftDispatcher};
use chainnft_media::MediaCache;
use chainnft_providers::{
    alchemy::{AlchemyNetwork, AlchemyProvider},
    kas::{KasNetwork, KasProvider},
    moralis::{MoralisNetwork, MoralisProvider},
};
use chainnft_resolver::ContentResolver;
use chainnft_storage::{DiskMetadataStore, MemoryObjectStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "owned" => cmd_owned(&args[2..]).await,
        "token" => cmd_token(&args[2..]).await,
        "resolve" => cmd_resolve(&args[2..]).await,
        "chains" => {
            cmd_chains();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chainnft {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainnft {}", env!("CARGO_PKG_VERSION"));
    println!("Aggregated NFT ownership and metadata across chains\n");
    println!("USAGE:");
    println!("    chainnft <COMMAND>\n");
    println!("COMMANDS:");
    println!("    owned      List NFTs held by a wallet");
    println!("    token      Fetch one NFT by contract + token id");
    println!("    resolve    Dereference a token content URI");
    println!("    chains     List wired networks");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("OWNED FLAGS:");
    println!("    --chain <CHAIN>    Network slug (see `chainnft chains`)  [required]");
    println!("    --owner <ADDR>     Wallet address                        [required]");
    println!("    --cursor <CURSOR>  Pagination token from the previous page");
    println!("    --resync           Bypass the cache and refetch upstream");
    println!("    --cache-media      Mirror media for returned records afterwards\n");
    println!("TOKEN FLAGS:");
    println!("    --chain <CHAIN>    Network slug                          [required]");
    println!("    --contract <ADDR>  Contract address                      [required]");
    println!("    --id <TOKEN_ID>    Token id (provider-native form)       [required]");
    println!("    --resync           Bypass the cache and refetch upstream");
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

struct App {
    dispatcher: NftDispatcher,
    store: Arc<DiskMetadataStore>,
    resolver: Arc<ContentResolver>,
}

/// Compose one engine per configured network over a shared store + resolver.
fn wire(config: &AppConfig) -> App {
    let resolver = Arc::new(ContentResolver::new(config.content_timeout));
    let store = Arc::new(DiskMetadataStore::new(config.data_dir.clone()));
    let meta: Arc<dyn MetadataStore> = store.clone();
    let width = config.resolve_concurrency;
    let timeout = config.provider_timeout;

    let alchemy = |network: AlchemyNetwork, key: &str| {
        Arc::new(ChainEngine::new(
            Arc::new(AlchemyProvider::new(network, key, timeout)),
            meta.clone(),
            width,
        ))
    };
    let kas = |network: KasNetwork| {
        Arc::new(ChainEngine::new(
            Arc::new(KasProvider::new(
                network,
                &config.kas.access_key_id,
                &config.kas.secret_access_key,
                resolver.clone(),
                timeout,
            )),
            meta.clone(),
            width,
        ))
    };
    let moralis = |network: MoralisNetwork| {
        Arc::new(ChainEngine::new(
            Arc::new(MoralisProvider::new(
                network,
                &config.moralis.api_key,
                resolver.clone(),
                timeout,
            )),
            meta.clone(),
            width,
        ))
    };

    let dispatcher = NftDispatcher::new()
        .with_engine(alchemy(AlchemyNetwork::EthMainnet, &config.alchemy.ethereum_api_key))
        .with_engine(alchemy(
            AlchemyNetwork::EthGoerli,
            &config.alchemy.ethereum_goerli_api_key,
        ))
        .with_engine(alchemy(
            AlchemyNetwork::PolygonMainnet,
            &config.alchemy.polygon_api_key,
        ))
        .with_engine(alchemy(
            AlchemyNetwork::PolygonMumbai,
            &config.alchemy.polygon_mumbai_api_key,
        ))
        .with_engine(kas(KasNetwork::Cypress))
        .with_engine(kas(KasNetwork::Baobab))
        .with_engine(moralis(MoralisNetwork::BscMainnet))
        .with_engine(moralis(MoralisNetwork::BscTestnet));

    App {
        dispatcher,
        store,
        resolver,
    }
}

fn parse_chain(args: &[String]) -> anyhow::Result<Chain> {
    let slug = parse_flag(args, "--chain").ok_or_else(|| anyhow!("--chain is required"))?;
    slug.parse::<Chain>().map_err(|e| anyhow!(e))
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn cmd_owned(args: &[String]) -> anyhow::Result<()> {
    let chain = parse_chain(args)?;
    let owner = parse_flag(args, "--owner").ok_or_else(|| anyhow!("--owner is required"))?;
    let cursor = parse_flag(args, "--cursor");
    let resync = has_flag(args, "--resync");

    let config = AppConfig::from_env().context("loading configuration")?;
    let app = wire(&config);

    let page = app
        .dispatcher
        .owned_nfts(chain, &owner, cursor.as_deref(), resync)
        .await?;
    println!("{}", serde_json::to_string_pretty(&page)?);

    if has_flag(args, "--cache-media") {
        let uncached: Vec<_> = page
            .nfts
            .into_iter()
            .filter(|nft| nft.source_url.is_none())
            .collect();
        if !uncached.is_empty() {
            let objects = Arc::new(MemoryObjectStore::default());
            let media = MediaCache::new(app.resolver.clone(), objects, app.store.clone());
            let cached = media.cache_media_batch(uncached).await;
            eprintln!("cached media for {} record(s)", cached.len());
        }
    }
    Ok(())
}

async fn cmd_token(args: &[String]) -> anyhow::Result<()> {
    let chain = parse_chain(args)?;
    let contract =
        parse_flag(args, "--contract").ok_or_else(|| anyhow!("--contract is required"))?;
    let token_id = parse_flag(args, "--id").ok_or_else(|| anyhow!("--id is required"))?;
    let resync = has_flag(args, "--resync");

    let config = AppConfig::from_env().context("loading configuration")?;
    let app = wire(&config);

    let record = app
        .dispatcher
        .single_nft(chain, &contract, &token_id, resync)
        .await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_resolve(args: &[String]) -> anyhow::Result<()> {
    let uri = parse_flag(args, "--uri").ok_or_else(|| anyhow!("--uri is required"))?;
    let resolver = ContentResolver::new(AppConfig::DEFAULT_CONTENT_TIMEOUT);

    match resolver.resolve_json(&uri).await {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => {
            // not JSON: fall back to the binary path and describe the bytes
            let bytes = resolver.resolve_bytes(&uri).await?;
            let content_type = chainnft_media::sniff_content_type(&bytes);
            println!("{} bytes, {content_type}", bytes.len());
        }
    }
    Ok(())
}

fn cmd_chains() {
    println!("Supported networks:\n");
    for chain in Chain::ALL {
        let kind = if chain.is_testnet() { "testnet" } else { "mainnet" };
        println!("  {:<18} {kind}", chain.as_str());
    }
}

// ─── Flag parsing ─────────────────────────────────────────────────────────────

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
