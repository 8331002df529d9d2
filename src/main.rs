//! Database console runtime.
//!
//! Decides how the console process is addressed and serves it.
//!
//! # Architecture Overview
//!
//! ```text
//!   environment ──┐
//!   config file ──┼─▶ runtime::RuntimeState ─┐
//!                 └─▶ auth::AuthSource ──────┤
//!                                            ▼
//!                                   lifecycle::Bootstrap
//!                                            │
//!                                            ▼
//!     Client  ───────▶  net::listener ─▶ http::server
//!                                            │
//!                        (standalone only)   ▼
//!                              middleware::ReverseProxied
//!                                            │
//!                                            ▼
//!                                         Router
//!                                  ┌─────────┴──────────┐
//!                                  ▼                    ▼
//!                           page/API layer      realtime::RealtimeHub
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use console_runtime::config::load_or_default;
use console_runtime::http::pages::default_pages;
use console_runtime::lifecycle::{startup, Bootstrap, Shutdown};
use console_runtime::observability::{logging, metrics};
use console_runtime::runtime::ProcessEnv;

#[derive(Parser)]
#[command(name = "console-runtime")]
#[command(about = "Runtime bootstrap for the database console", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve in debug mode (verbose error responses).
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    config.server.debug |= cli.debug;

    logging::init_logging(&config.observability, config.server.debug);
    tracing::info!("console-runtime v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bootstrap = Bootstrap::resolve(config, &ProcessEnv)?;

    let shutdown = Arc::new(Shutdown::new());
    shutdown.trigger_on_signal();

    if let Err(e) = startup::run(bootstrap, default_pages(), &shutdown).await {
        tracing::error!(error = %e, "Console runtime failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
