//! Fleet — car rental fleet registry
//!
//! Usage:
//!   fleet serve --config fleet.toml        # bootstrap the store and serve HTTP
//!   fleet init  --config fleet.toml        # bootstrap the store and exit
//!   fleet list  --config fleet.toml        # print available cars

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleet::api::{self, AppState};
use fleet::config::Config;
use fleet::registry::FleetRegistry;

#[derive(Parser)]
#[command(name = "fleet", about = "Car rental fleet registry", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bootstrap the car store and serve the HTTP API.
    Serve {
        /// Path to the TOML configuration file. Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Bootstrap the car store schema and exit.
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the cars currently available for rent.
    List {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve { config } => run_serve(config).await,
        Command::Init { config } => run_init(config),
        Command::List { config } => run_list(config),
    };

    if let Err(e) = result {
        error!(error = %format!("{e:#}"), "Fatal");
        std::process::exit(1);
    }
}

fn open_registry(config_path: Option<PathBuf>) -> anyhow::Result<(Config, FleetRegistry)> {
    let cfg = Config::load(config_path.as_deref()).context("Failed to load config")?;
    let registry = FleetRegistry::open(&cfg.database)
        .with_context(|| format!("Failed to bootstrap store at {}", cfg.database.path.display()))?;
    Ok((cfg, registry))
}

async fn run_serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (cfg, registry) = open_registry(config_path)?;

    info!(
        db = ?cfg.database.path,
        bind = %cfg.server.bind,
        port = cfg.server.port,
        cars = registry.count()?,
        "Starting fleet registry"
    );

    api::start_server(AppState::new(registry), &cfg.server.bind, cfg.server.port)
        .await
        .context("HTTP server error")?;
    info!("Server stopped");
    Ok(())
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (_cfg, registry) = open_registry(config_path)?;
    println!("Store ready: {} ({} cars)", registry.path().display(), registry.count()?);
    Ok(())
}

fn run_list(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (_cfg, registry) = open_registry(config_path)?;
    let cars = registry.list_available()?;

    println!("=== Available cars ===");
    if cars.is_empty() {
        println!("(none)");
    }
    for car in &cars {
        println!(
            "  {:<12} {:<20} {:>8} km  (id {})",
            car.registration, car.model, car.mileage, car.id
        );
    }
    Ok(())
}
