//! Logging setup
//!
//! Logs go to stderr so the report on stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "busload=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// Single-line human-readable records
    Compact,
    /// Production: JSON structured logging
    Json,
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default `busload=info` filter.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}
