//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level. Events always go to
//! stderr. A configured general log file receives the same events (without
//! ANSI colors); a configured error log file receives ERROR events only.

use anyhow::{Context, Result};
use namebase_common::config::LoggingConfig;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Build the level filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level '{}'", config.level)),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory {}", parent.display())
            })?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Assemble the subscriber without installing it
pub fn build_subscriber(
    config: &LoggingConfig,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let file_layer = match &config.file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    let error_layer = match &config.error_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(open_log_file(path)?))
                .with_filter(LevelFilter::ERROR),
        ),
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(env_filter(config)?)
        .with(fmt::layer())
        .with(file_layer)
        .with(error_layer))
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    build_subscriber(config)?
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
