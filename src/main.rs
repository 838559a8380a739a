//! devfront: local development front-end.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                      DEVFRONT                         │
//!                    │                                                       │
//!   Client Request   │  ┌──────────┐    ┌───────────┐                        │
//!   ─────────────────┼─▶│   http   │───▶│  routing  │                        │
//!                    │  │  server  │    │   table   │                        │
//!                    │  └──────────┘    └─────┬─────┘                        │
//!                    │                        │                              │
//!                    │           ┌────────────┴─────────────┐                │
//!                    │           ▼                          ▼                │
//!                    │  ┌─────────────────┐       ┌──────────────────┐       │
//!                    │  │      site       │       │      proxy       │       │
//!                    │  │ nginx rule cache│       │ header rewrite   │──────┼──▶ Upstream
//!                    │  │ try_files       │       │ cookie jar       │◀─────┼───
//!                    │  │ static response │       │ Set-Cookie split │       │
//!                    │  └─────────────────┘       └──────────────────┘       │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use devfront::config::{load_config, DevServerConfig};
use devfront::config::validation::validate_config;
use devfront::lifecycle::startup::{log_summary, preflight};
use devfront::lifecycle::Shutdown;
use devfront::observability::init_logging;
use devfront::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "devfront")]
#[command(about = "Serve a build tree with nginx try_files semantics and proxy API calls", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Served tree root (overrides site.root)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Port to listen on, all interfaces (overrides listener.bind_address)
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL (overrides proxy.upstream)
    #[arg(short, long)]
    upstream: Option<String>,

    /// nginx-style routing document (overrides site.nginx_conf)
    #[arg(long)]
    nginx_conf: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<DevServerConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => DevServerConfig::default(),
        };

        if let Some(root) = self.root {
            config.site.root = root;
        }
        if let Some(port) = self.port {
            config.listener.bind_address = format!("0.0.0.0:{port}");
        }
        if let Some(upstream) = self.upstream {
            config.proxy.upstream = upstream;
        }
        if let Some(nginx_conf) = self.nginx_conf {
            config.site.nginx_conf = nginx_conf;
        }

        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability);

    tracing::info!("devfront v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = preflight(&config) {
        tracing::error!(error = %e, "Startup check failed");
        std::process::exit(e.exit_code());
    }
    log_summary(&config);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        docs = %format!("http://localhost:{}{}", local_addr.port(), config.site.docs_prefix),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
