mod app;
mod form;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use client::{ApiClient, CredentialStore, Session};
use shared::config::load_config;
use shared::types::ClientConfig;

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "ums-tui", version, about = "Terminal dashboard for the university management service")]
struct Args {
    /// Path to the client configuration file
    #[arg(short, long, default_value = "client.toml")]
    config: PathBuf,

    /// Override the backend base URL from the config
    #[arg(long)]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The terminal owns stdout in raw mode; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut config = if args.config.exists() {
        load_config(&args.config.to_string_lossy())
            .with_context(|| format!("loading config from {}", args.config.display()))?
    } else {
        info!("No config file at {}, using defaults", args.config.display());
        ClientConfig::default()
    };
    if let Some(server) = args.server {
        config.server.base_url = server;
    }

    let store = CredentialStore::new(&config.storage.session_file);
    let api = ApiClient::new(&config.server.base_url, store.clone())
        .with_context(|| format!("invalid base URL {}", config.server.base_url))?;
    let mut session = Session::new(store);
    session.restore().await;

    let mut terminal = ratatui::init();
    let result = App::new(config, api, session).run(&mut terminal).await;
    ratatui::restore();
    result
}
