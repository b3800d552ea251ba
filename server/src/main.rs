use anyhow::Context;
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tally_ledger::Ledger;
use tally_server::{Api, Config, Service};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let config_file = std::fs::read_to_string(&args.config)
        .with_context(|| format!("could not read config file {}", args.config.display()))?;
    let config: Config =
        serde_yaml::from_str(&config_file).context("could not parse config file")?;
    let mut config = config.validate().context("invalid config")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // Open ledger
    let ledger = Ledger::open(&config.database)
        .with_context(|| format!("failed to open ledger {}", config.database.display()))?;
    info!(
        database = %config.database.display(),
        players = config.roster.len(),
        organizer = %config.organizer,
        "loaded config"
    );

    let port = config.port;
    let service = Arc::new(Service::new(config, ledger));
    let api = Api::new(service);
    let app = api.router();

    // Start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("axum server error")?;

    Ok(())
}
