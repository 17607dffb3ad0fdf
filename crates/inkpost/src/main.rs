//! Inkpost - multi-author blogging server

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod seed;

use config::{Config, LoggingConfig};
use inkpost_api::{AppState, create_router};
use inkpost_auth::{AccessGuard, JwtManager, PasswordHasher, SessionCookies};
use inkpost_db::Database;

/// Inkpost - multi-author blogging server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "INKPOST_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "INKPOST_PORT")]
    port: Option<u16>,

    /// Create demo users, categories and posts before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging);

    config.validate().context("Invalid configuration")?;

    info!("Starting Inkpost v{}", env!("CARGO_PKG_VERSION"));

    // Create the database directory for file-backed SQLite
    if let Some(dir) = sqlite_parent_dir(&config.database.url) {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }

    // Initialize database
    let db = Database::new(&config.database.url)
        .await
        .context("Failed to open database")?;

    // Session core
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        chrono::Duration::days(config.auth.token_ttl_days),
    ));
    let passwords = PasswordHasher::new(config.auth.pbkdf2_iterations);
    let secure_cookies = config.is_production();
    if !secure_cookies {
        warn!("Running in {} mode: session cookies are not marked Secure", config.server.environment);
    }
    let cookies = SessionCookies::new(
        secure_cookies,
        config.auth.token_ttl_days * 24 * 60 * 60,
    );
    let guard = AccessGuard::new(
        jwt.clone(),
        config.auth.protected_prefixes.clone(),
        &config.auth.login_path,
    );

    // Create application state
    let state = AppState::new(db, jwt, passwords, cookies, guard);

    if args.seed {
        seed::seed_demo_data(&state).await?;
    }

    // Install the Prometheus recorder
    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);
    info!("Protected prefixes: {:?}", config.auth.protected_prefixes);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Parent directory of a file-backed SQLite URL, if it has one
fn sqlite_parent_dir(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(sqlite_parent_dir("sqlite://data/inkpost.db"), Some(PathBuf::from("data")));
        assert_eq!(
            sqlite_parent_dir("sqlite:/var/lib/inkpost/blog.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/inkpost"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://inkpost.db"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/blog"), None);
    }
}
