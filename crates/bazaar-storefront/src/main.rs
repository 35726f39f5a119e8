//! Bazaar storefront server.

use anyhow::{Context, Result};
use clap::Parser;

use bazaar_storefront::telemetry::{init_tracing, LogFormat};
use bazaar_storefront::StorefrontConfig;

/// Bazaar storefront - catalog, cart, checkout and admin over HTTP
#[derive(Parser)]
#[command(name = "bazaar-storefront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (TOML, or JSON by extension)
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// SQLite database path (or :memory:)
    #[arg(long)]
    database: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<StorefrontConfig> {
        let mut config = match self.config.as_deref() {
            Some(path) => StorefrontConfig::load(path)?,
            None => StorefrontConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(database) = self.database {
            config.database.path = database;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    init_tracing(&config.logging.level, config.logging.format)
        .context("Failed to initialize logging")?;

    let app = bazaar_storefront::app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(address = %config.server.bind, "storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("storefront stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
    }
}
