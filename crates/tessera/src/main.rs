//! # Tessera - partial page rendering server
//!
//! Serves template-driven pages. Ordinary requests get the full HTML;
//! AJAX requests with `?node_name=` get a JSON object holding the node's
//! content, styles, canonical link, meta tags and scripts, so the client
//! can swap in one region of the page without a reload.
//!
//! ## Architecture
//! ```text
//! Client → Tessera → TemplateEngine (template_dir)
//!             ↓
//!          CaptchaGenerator → media_root/img/tmp
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod blocks;
mod captcha;
mod config;
mod hashing;
mod partial;
mod routes;
mod state;
mod template;

use config::AppConfig;
use state::AppState;

/// Tessera - partial page rendering server
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/tessera.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Template directory (overrides config)
    #[arg(long, env = "TEMPLATE_DIR")]
    template_dir: Option<String>,

    /// Secret key used to salt captcha hashes (overrides config)
    #[arg(long, env = "MOSAIC_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before clap reads the environment
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Tessera v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!(
        pages = config.pages.len(),
        template_dir = %config.template_dir,
        "Configuration loaded from {}",
        args.config
    );

    // Initialize application state
    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(config)?;
    if state.captcha.is_some() {
        info!("CAPTCHA assets loaded");
    }

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!("Tessera listening on {}", listen_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Tessera shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()?;
    }

    Ok(())
}
