#![forbid(unsafe_code)]

//! `oasis-relay` — WebSocket-to-polling relay binary.
//!
//! Resolves configuration from an optional TOML file plus command-line
//! overrides, then serves the relay until the listener fails.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use oasis_relay::mode::{FeedAddress, TenancyMode};
use oasis_relay::{server, AppError, RelayConfig, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "oasis-relay", about = "WebSocket to HTTP polling relay", version, long_about = None)]
struct Cli {
    /// Listen address, e.g. `127.0.0.1:8080`.
    #[arg(value_name = "ADDR")]
    listen: Option<String>,

    /// Listen address; takes precedence over the positional form.
    #[arg(long)]
    addr: Option<String>,

    /// Tenancy mode (single or multi).
    #[arg(long, value_enum)]
    mode: Option<TenancyMode>,

    /// Dashboard feed addressing profile.
    #[arg(long, value_enum)]
    feed_address: Option<FeedAddress>,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    let config = resolve_config(args)?;
    info!(listen_addr = %config.listen_addr, "oasis-relay bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(server::run(config))
}

/// Layer command-line overrides on top of the file (or default) config.
fn resolve_config(args: Cli) -> Result<RelayConfig> {
    let mut config = match args.config {
        Some(path) => RelayConfig::load_from_path(path)?,
        None => RelayConfig::default(),
    };

    if let Some(addr) = args.addr.or(args.listen) {
        config.listen_addr = addr;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(feed_address) = args.feed_address {
        config.feed_address = Some(feed_address);
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
