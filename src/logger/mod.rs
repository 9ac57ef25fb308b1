//! Logger module
//!
//! Provides logging utilities for the error page server including:
//! - Diagnostics through `tracing` (stderr or an error log file)
//! - Access logging with multiple formats
//! - Server lifecycle logging

mod format;
pub mod writer;

#[cfg(test)]
pub mod capture;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::io;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logger with configuration
///
/// Should be called once at application startup. `RUST_LOG` takes precedence
/// over `logging.level`.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.error_log_file.as_deref() {
        Some(path) => {
            let file = writer::open_log_file(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
        None => registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init(),
    }
    .map_err(io::Error::other)?;

    if config.access_log {
        writer::init(config.access_log_file.as_deref())?;
    }
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    log_info("======================================");
    log_info("Error page server started successfully");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Error pages: {}", config.errors.root_path));
    log_info(&format!("Default format: {}", config.errors.default_format));
    if config.errors.debug {
        log_info("Debug header echo: enabled");
    }
    log_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}
