use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use holderworld::{
    assignments::AssignmentStore,
    config::{self, Config},
    holders::HolderFetcher,
    logger::{self, LogTag, LoggerConfig},
    world::WorldBuilder,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Token holder world service
#[derive(Parser, Debug)]
#[command(name = "holderworld", version, about)]
struct Cli {
    /// Config file (default: data/config.toml under the HolderWorld directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logs for a tag (rpc, holders, store, world, webserver, all)
    #[arg(long = "debug", value_name = "TAG", global = true)]
    debug: Vec<String>,

    /// Enable verbose logs for every tag
    #[arg(long, global = true)]
    verbose: bool,

    /// Do not write the daily log file
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print current holders of a mint
    Holders {
        #[arg(long)]
        mint: Option<String>,
        #[arg(long)]
        min: Option<f64>,
    },
    /// Print the world snapshot of a mint
    World {
        #[arg(long)]
        mint: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        char_count: Option<u32>,
    },
    /// Refresh stored assignments once (for cron or a systemd timer)
    Refresh,
    /// Delete every character assignment
    Reset {
        /// Required; reset is not reversible
        #[arg(long)]
        force: bool,
    },
    /// Store the default token mint
    SetMint { mint: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = holderworld::paths::ensure_all_directories() {
        eprintln!("Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    let loaded = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };
    if let Err(e) = loaded {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    }

    let file_logging = config::with_config(|c| c.logging.file_logging) && !cli.no_file_log;
    logger::init(LoggerConfig::from_flags(&cli.debug, cli.verbose, file_logging));

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            logger::error(LogTag::System, &format!("{:#}", e));
            1
        }
    };

    logger::flush();
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::get_config_clone();
    let world = Arc::new(build_world(&config)?);

    let result = match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(&config, world.clone(), host, port).await,
        Command::Holders { mint, min } => {
            let mint = mint
                .or_else(|| Some(config.world.token_mint.clone()))
                .filter(|m| !m.trim().is_empty())
                .ok_or_else(|| anyhow!("No mint given and world.token_mint is not set"))?;
            let min = min.unwrap_or(config.world.min_hold);
            let holders = world.fetcher().fetch_holders(&mint, min).await?;
            print_json(&holders)
        }
        Command::World {
            mint,
            min,
            char_count,
        } => {
            let mint = world
                .resolve_mint(mint.as_deref())
                .await?
                .ok_or_else(|| anyhow!("No token yet"))?;
            let snapshot = world
                .build(
                    &mint,
                    min.unwrap_or(config.world.min_hold),
                    char_count.unwrap_or(config.world.char_count),
                )
                .await?;
            print_json(&snapshot)
        }
        Command::Refresh => refresh(&world).await,
        Command::Reset { force } => {
            if !force {
                bail!("Refusing to delete every assignment without --force");
            }
            let deleted = world
                .store()
                .clone()
                .run_blocking(|store| store.reset())
                .await?;
            print_json(&json!({ "success": true, "deletedCount": deleted }))
        }
        Command::SetMint { mint } => {
            let stored = world.set_token_mint(&mint).await?;
            print_json(&json!({ "tokenMint": stored }))
        }
    };

    if let Err(e) = world.store().close() {
        logger::warning(LogTag::Store, &format!("Failed to close store: {}", e));
    }
    result
}

fn build_world(config: &Config) -> anyhow::Result<WorldBuilder> {
    let fetcher = HolderFetcher::from_config(&config.rpc).context("RPC client setup failed")?;
    let store = AssignmentStore::from_config(&config.store).context("assignment store setup failed")?;
    logger::info(
        LogTag::System,
        &format!("HolderWorld starting ({} assignment store)", store.mode()),
    );
    Ok(WorldBuilder::new(
        Arc::new(fetcher),
        Arc::new(store),
        config.world.clone(),
    ))
}

/// One world build for the configured token, persisting assignments
async fn refresh(world: &WorldBuilder) -> anyhow::Result<()> {
    let mint = world
        .resolve_mint(None)
        .await?
        .ok_or_else(|| anyhow!("No token yet"))?;
    let config = world.config();
    let snapshot = world.build(&mint, config.min_hold, config.char_count).await?;

    logger::info(
        LogTag::World,
        &format!("Refreshed {}: {} characters", mint, snapshot.characters.len()),
    );
    print_json(&json!({ "mint": mint, "characters": snapshot.characters.len() }))
}

#[cfg(feature = "web")]
async fn serve(
    config: &Config,
    world: Arc<WorldBuilder>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    use holderworld::webserver::{start_server, AppState};

    let mut webserver = config.webserver.clone();
    if let Some(host) = host {
        webserver.host = host;
    }
    if let Some(port) = port {
        webserver.port = port;
    }

    let state = Arc::new(AppState::new(webserver, world));
    start_server(state).await.map_err(|e| anyhow!(e))
}

#[cfg(not(feature = "web"))]
async fn serve(
    _config: &Config,
    _world: Arc<WorldBuilder>,
    _host: Option<String>,
    _port: Option<u16>,
) -> anyhow::Result<()> {
    bail!("holderworld was built without the `web` feature")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
