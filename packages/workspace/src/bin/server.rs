use anyhow::Context;
use blockpatch_workspace::{router, ChatCompletionsProvider, Config, EditService, FileStore};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blockpatch-server")]
#[command(about = "HTTP API for instruction-driven document edits", version)]
struct Args {
    /// Path to a config file (default: <root>/blockpatch.config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the store path is resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Override the configured host
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_file(path)?,
        None => Config::load(&args.root)?,
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let store_dir = config.store_path(&args.root);
    let store = Arc::new(FileStore::new(&store_dir));
    let provider = Arc::new(ChatCompletionsProvider::from_config(&config.generation)?);
    let service = Arc::new(EditService::new(
        store,
        provider,
        config.generation.timeout(),
        config.history_capacity,
    ));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        store = %store_dir.display(),
        model = %config.generation.model,
        "blockpatch server listening"
    );

    axum::serve(listener, router(service)).await?;
    Ok(())
}
