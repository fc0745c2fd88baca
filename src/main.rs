//! frame-proxy
//!
//! # Architecture Overview
//!
//! ```text
//!   <iframe src="proxy/?url=...">
//!            │
//!            ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐
//!   │ http handler │──▶│   upstream   │──▶│ target site              │
//!   │ (validate)   │   │   client     │   └──────────────────────────┘
//!   └──────┬───────┘   └──────┬───────┘
//!          │                  ▼
//!          │          ┌──────────────┐   ┌──────────────────────────┐
//!          │          │ header       │──▶│ dispatch: html │ css │   │
//!          │          │ sanitizer    │   │ passthrough (bytes)      │
//!          │          └──────────────┘   └────────────┬─────────────┘
//!          ▼                                          ▼
//!   error → 400/500 + CORS               rewritten response + CORS
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use frame_proxy::config::{load_config_with, ConfigError, ConfigOverrides, ProxyConfig};
use frame_proxy::http::HttpServer;
use frame_proxy::lifecycle::Shutdown;
use frame_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "frame-proxy")]
#[command(about = "Rewriting reverse proxy for embedding third-party sites in an iframe", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "FRAME_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override proxy.public_url.
    #[arg(long)]
    public_url: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind_address: self.bind.clone(),
            public_url: self.public_url.clone(),
        }
    }

    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        load_config_with(self.config.as_deref(), &self.overrides())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability);
    tracing::info!("frame-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        upstream_timeout_secs = config.upstream.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let mut shutdown = Shutdown::new();
    shutdown.spawn(HttpServer::new(config)?, listener);

    // Servers stop on SIGINT/SIGTERM and finish in-flight requests.
    shutdown.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
