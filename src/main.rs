//! Usuarios service binary
//!
//! ```sh
//! # Run with default config (~/.config/usuarios-service/config.toml)
//! usuarios-service
//!
//! # Custom config path and port
//! usuarios-service --config /etc/usuarios/config.toml --port 8080
//!
//! # Validate config without starting
//! usuarios-service --check
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use usuarios::config::{AppConfig, ConfigError};
use usuarios::server::{init_tracing, ServerHandle};

/// User registration, login and profile lookup over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "usuarios-service",
    version,
    about = "User account service with JWT authentication",
    long_about = "REST API for registering users, logging in with email and password \
                  and fetching the authenticated user's profile.\n\n\
                  Default config: ~/.config/usuarios-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USUARIOS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,
}

/// File and environment first, then the command line on top.
fn load_config(cli: &Cli, path: &Path) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(path)?;
    if let Some(port) = cli.port {
        config.server.port = port;
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(usuarios::default_config_path);

    // Tracing is not installed yet, report straight to stderr.
    let config = match load_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let jwt = config.security.jwt_config();
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!(
            "   Database    : {}",
            config.database.to_database_config().redacted_url()
        );
        println!("   JWT secret  : <redacted>");
        match jwt.expiration_hours {
            Some(hours) => println!("   JWT expiry  : {}h", hours),
            None => println!("   JWT expiry  : never"),
        }
        println!("   Bcrypt cost : {}", config.security.bcrypt_cost);
        println!(
            "   Log         : {} ({})",
            config.logging.level, config.logging.format
        );
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // ── Prometheus metrics recorder ────────────────────────────
    let prometheus = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()
    {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    };

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(&config, prometheus).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    // Returns once a signal arrives or the listener fails
    handle.wait().await;

    Ok(())
}
