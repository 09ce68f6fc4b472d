//! Sadara API server
//!
//! ```sh
//! # Default config (~/.config/sadara-api/config.toml)
//! sadara-api
//!
//! # Custom config path and port
//! sadara-api --config /etc/sadara/config.toml --port 8080
//!
//! # Validate config without starting
//! sadara-api --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use sadara_api::config::{default_config_path, AppConfig};
use sadara_api::infrastructure::database::redact_url;
use sadara_api::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "sadara-api",
    version,
    about = "Back-office REST API for the Sadara sports agency",
    long_about = "Players, clubs and dashboard statistics over a Redis-backed response cache.\n\n\
                  Default config: ~/.config/sadara-api/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "SADARA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    // A missing file yields defaults; an unreadable or invalid one is fatal.
    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", redact_url(&config.database.url));
        println!("   Store       : {:?} ({})", config.redis.backend, redact_url(&config.redis.url));
        println!("   Cache       : {}", if config.cache.enabled { "enabled" } else { "disabled" });
        println!(
            "   Rate limit  : {} requests / {}s{}",
            config.rate_limit.max_requests,
            config.rate_limit.window_secs,
            if config.rate_limit.enabled { "" } else { " (disabled)" }
        );
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start server: {}", e);
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
