//! Shard server - turn two columns of a CSV file into an interactive graph.
//!
//! A single binary that provides:
//! - Upload form with a preview of the parsed table
//! - Column selection and node validation
//! - Spring-laid network view plus an exploratory view of the data

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use shard_server::config::ShardConfig;
use shard_server::server::{create_router, AppState};
use shard_server::storage::UploadStorage;

/// Shard CSV graph explorer
#[derive(Parser, Debug)]
#[command(name = "shard-server")]
#[command(about = "Upload a CSV, pick two columns, explore the graph")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .shardrc.toml in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// HTTP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for uploaded CSV files
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => ShardConfig::load_file(path),
        None => ShardConfig::load(&std::env::current_dir()?),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.upload_dir {
        config.storage.upload_dir = dir;
    }

    let storage = UploadStorage::new(&config.storage.upload_dir).with_context(|| {
        format!(
            "Failed to open upload directory {}",
            config.storage.upload_dir.display()
        )
    })?;
    info!("Uploads stored in {:?}", storage.root());

    let addr = config.listen_addr();
    let state = AppState::new(config, storage).context("Failed to load page templates")?;
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Shard {} listening on http://{}", shard_core::version(), addr);

    axum::serve(listener, router).await?;
    Ok(())
}
