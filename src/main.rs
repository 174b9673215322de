//! # Pad Bridge
//!
//! Drive the desktop with a phone-based game controller.
//!
//! This application listens for controller connections over WebSocket and
//! injects the matching keyboard and pointer events through uinput.

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pad_bridge::config::{Config, LoggingConfig};
use pad_bridge::controller::InputTranslator;
use pad_bridge::server::Server;
use pad_bridge::sink::UinputSink;

/// Configuration file loaded at startup when present
const CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "pad-bridge.log";

/// Main entry point for Pad Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load `config/default.toml` (defaults when missing)
///    - Set up logging with tracing subscriber
///    - Create the uinput virtual device
///    - Bind the WebSocket listener
///
/// 2. **Main Loop**
///    - Serve one controller session at a time
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Release every key still held
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is invalid
/// - `/dev/uinput` is not accessible
/// - The listening port cannot be bound
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH)
        .with_context(|| format!("Failed to load configuration from {}", CONFIG_PATH))?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Pad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Screen {}x{}, scale factor {}, right stick threshold {}",
        config.screen.width,
        config.screen.height,
        config.pointer.scale_factor,
        config.right_stick.threshold
    );

    let translator = InputTranslator::from_config(&config);

    let mut sink = UinputSink::new(&config.input.device_name, translator.geometry())
        .context("Failed to create virtual input device")?;
    if let Some(path) = sink.device_path() {
        info!("Virtual input device at {}", path.display());
    }

    let server = Server::bind(&config.bind_addr(), translator, Box::new(sink))
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    let bridge = server.bridge();

    info!("Press Ctrl+C to exit");

    tokio::select! {
        result = server.run() => result?,

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            bridge.lock().await.end_session();
        }
    }

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. When `log_dir` is set, a daily
/// rolling file receives a copy of every line.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.log_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    Some(guard)
}
