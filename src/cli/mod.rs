// CLI module - Command line interface and argument parsing

use crate::constants::{DEFAULT_CONFIG_PATH, DEFAULT_METRICS_ADDR};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human readable lines
    Text,
}

/// bmc-cert-sync - Keep BMC TLS certificates in sync with staged files
///
/// Polls every configured BMC, compares the certificate it presents with the
/// staged certificate file and pushes the staged one through SAA on mismatch.
#[derive(Parser, Debug, Clone)]
#[command(name = "bmc-cert-sync")]
#[command(version)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Listen address for the Prometheus metrics endpoint
    #[arg(long = "metrics-addr", value_name = "ADDR", default_value = DEFAULT_METRICS_ADDR)]
    pub metrics_addr: String,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// Run a single pass over all servers and exit
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Install the global tracing subscriber
    ///
    /// Respects `RUST_LOG`, defaulting to `info`.
    pub fn init_logging(&self) -> crate::Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        let installed = match self.log_format {
            LogFormat::Json => builder.json().with_current_span(true).try_init(),
            LogFormat::Text => builder.try_init(),
        };

        installed.map_err(|e| anyhow::anyhow!("Failed to set subscriber: {}", e))
    }
}
