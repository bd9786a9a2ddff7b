//! blocksync CLI — run and inspect per-chain sync engines.
//!
//! Usage:
//! ```bash
//! # Sync ethereum/mainnet into a SQLite file
//! blocksync run --protocol ethereum --network mainnet \
//!     --rpc-url https://cloudflare-eth.com --db ./sync.db --start 19000000
//!
//! # Show stored positions
//! blocksync status --db ./sync.db
//!
//! # Forget a pair's position (next run resumes from --start)
//! blocksync reset --db ./sync.db --protocol ethereum --network mainnet
//! ```

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use blocksync_core::{PositionStore, Sequential};
use blocksync_evm::{EvmBlockSource, HttpRpcClient, RecordBlocks};
use blocksync_storage::records::BlockRecordStore;
use blocksync_storage::sqlite::SqliteStorage;
use blocksync_storage::MemoryStorage;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "status" => cmd_status(&args[2..]).await,
        "reset" => cmd_reset(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("blocksync {}", env!("CARGO_PKG_VERSION"));
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
    println!("blocksync {}", env!("CARGO_PKG_VERSION"));
    println!("Sequential per-chain block synchronization\n");
    println!("USAGE:");
    println!("    blocksync <COMMAND>\n");
    println!("COMMANDS:");
    println!("    run      Sync one (protocol, network) pair block by block");
    println!("    status   Show stored sync positions");
    println!("    reset    Delete a pair's stored position");
    println!("    version  Print version");
    println!("    help     Print this help\n");
    println!("RUN FLAGS:");
    println!("    --rpc-url <URL>    JSON-RPC endpoint  [required]");
    println!("    --protocol <P>     Protocol slug      [default: ethereum]");
    println!("    --network <N>      Network slug       [default: mainnet]");
    println!("    --db <PATH>        SQLite file (omit for in-memory)");
    println!("    --start <HEIGHT>   Position for pairs with no record yet  [default: 0]");
    println!("    --poll-ms <MS>     Wait between steps at the chain tip    [default: 2000]");
    println!("    --until <HEIGHT>   Stop after reaching this height");
}

struct RunConfig {
    protocol: String,
    network: String,
    rpc_url: String,
    start: u64,
    poll: Duration,
    until: Option<u64>,
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let cfg = RunConfig {
        protocol: parse_flag(args, "--protocol").unwrap_or_else(|| "ethereum".into()),
        network: parse_flag(args, "--network").unwrap_or_else(|| "mainnet".into()),
        rpc_url: parse_flag(args, "--rpc-url")
            .ok_or_else(|| anyhow::anyhow!("--rpc-url is required"))?,
        start: parse_u64_flag(args, "--start")?.unwrap_or(0),
        poll: Duration::from_millis(parse_u64_flag(args, "--poll-ms")?.unwrap_or(2000)),
        until: parse_u64_flag(args, "--until")?,
    };

    match parse_flag(args, "--db") {
        Some(path) => {
            let storage = SqliteStorage::open(&path)
                .await?
                .with_start_height(cfg.start);
            drive(cfg, Arc::new(storage)).await
        }
        None => {
            info!("no --db given; positions and records are in-memory only");
            let storage = MemoryStorage::starting_at(cfg.start);
            drive(cfg, Arc::new(storage)).await
        }
    }
}

/// The scheduling loop around the engine: one `advance` per iteration,
/// immediate continuation while catching up, `--poll-ms` wait at the chain
/// tip or after an error. One engine per process keeps at most one step in
/// flight for the pair.
async fn drive<S>(cfg: RunConfig, storage: Arc<S>) -> anyhow::Result<()>
where
    S: PositionStore + BlockRecordStore + Send + Sync + 'static,
{
    let source = EvmBlockSource::new(HttpRpcClient::default_for(&cfg.rpc_url));
    let action = RecordBlocks::new(storage.clone());
    let engine = Sequential::new(
        cfg.protocol.as_str(),
        cfg.network.as_str(),
        storage,
        source,
        action,
    );

    info!(
        protocol = %engine.protocol(),
        network = %engine.network(),
        rpc_url = %cfg.rpc_url,
        "starting sync"
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            result = engine.advance() => match result {
                Ok(height) => {
                    info!(height, "advanced");
                    if cfg.until.is_some_and(|until| height >= until) {
                        info!(height, "target height reached");
                        return Ok(());
                    }
                }
                Err(e) if e.is_not_available() => {
                    debug!(height = e.height(), "at chain tip; waiting");
                    tokio::time::sleep(cfg.poll).await;
                }
                Err(e) => {
                    error!(error = %e, height = e.height(), "advance failed");
                    tokio::time::sleep(cfg.poll).await;
                }
            }
        }
    }
}

async fn cmd_status(args: &[String]) -> anyhow::Result<()> {
    let path = parse_flag(args, "--db").ok_or_else(|| anyhow::anyhow!("--db is required"))?;
    let storage = SqliteStorage::open(&path).await?;

    let positions = storage.positions().await?;
    if positions.is_empty() {
        println!("No sync positions stored.");
        return Ok(());
    }

    println!("{:<12} {:<12} {:>12}  UPDATED", "PROTOCOL", "NETWORK", "HEIGHT");
    for p in positions {
        let updated = chrono::DateTime::from_timestamp(p.updated_at, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".into());
        println!("{:<12} {:<12} {:>12}  {updated}", p.protocol, p.network, p.height);
    }
    Ok(())
}

async fn cmd_reset(args: &[String]) -> anyhow::Result<()> {
    let path = parse_flag(args, "--db").ok_or_else(|| anyhow::anyhow!("--db is required"))?;
    let protocol =
        parse_flag(args, "--protocol").ok_or_else(|| anyhow::anyhow!("--protocol is required"))?;
    let network =
        parse_flag(args, "--network").ok_or_else(|| anyhow::anyhow!("--network is required"))?;

    let storage = SqliteStorage::open(&path).await?;
    storage.delete_position(&protocol, &network).await?;
    println!("Position for {protocol}/{network} deleted.");
    Ok(())
}

fn parse_flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u64_flag(args: &[String], name: &str) -> anyhow::Result<Option<u64>> {
    match parse_flag(args, name) {
        Some(v) => Ok(Some(v.parse().map_err(|_| {
            anyhow::anyhow!("{name} expects an integer, got '{v}'")
        })?)),
        None => Ok(None),
    }
}
