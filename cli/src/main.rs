//! Park Tracker CLI server
//!
//! ```sh
//! # Run with default config (~/.config/park-tracker/config.toml)
//! park-tracker
//!
//! # Custom config path
//! park-tracker --config /etc/park-tracker/config.toml
//!
//! # Override the listen port
//! park-tracker --port 3000
//!
//! # Validate config without starting
//! park-tracker --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use park_tracker::config::AppConfig;
use park_tracker::server::{init_tracing, ServerHandle, ServerOptions};

/// Park Tracker web server.
#[derive(Parser, Debug)]
#[command(
    name = "park-tracker",
    version,
    about = "Park Tracker web server",
    long_about = "Park Tracker: server-rendered account registration backed by SQLite.\n\n\
                  Default config: ~/.config/park-tracker/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PARK_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Override the HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(park_tracker::default_config_path);

    let mut tracing_ready = false;
    let mut config = if config_path.exists() {
        match AppConfig::load(&config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                if cli.check {
                    eprintln!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
                fallback_tracing();
                tracing_ready = true;
                error!("Failed to load config from {}: {}", config_path.display(), e);
                error!("Using default configuration.");
                AppConfig::default()
            }
        }
    } else {
        AppConfig::default()
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.listen_address());
        println!("   Database    : {}", config.database.connection_url());
        println!("   Bcrypt cost : {}", config.security.bcrypt_cost);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    if !tracing_ready {
        init_tracing(&config);
    }
    info!("Configuration: {}", config_path.display());

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

fn fallback_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();
}
