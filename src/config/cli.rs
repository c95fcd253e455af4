//! Command-line argument parsing for the discovery tool

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Resolve the node list behind an ElastiCache memcached configuration endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "memcache-discover")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    // ===== Connection Options =====
    /// Configuration endpoint as host:port
    #[arg(short = 'e', long = "endpoint")]
    pub endpoint: Option<String>,

    /// JSON file with {"location": ..., "options": {...}}
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Timeout for connect/read/write on the configuration endpoint
    #[arg(long = "cluster-timeout-ms")]
    pub cluster_timeout_ms: Option<u64>,

    /// Treat the configuration endpoint as the only node if discovery fails
    #[arg(long = "ignore-cluster-errors")]
    pub ignore_cluster_errors: bool,

    // ===== Output Options =====
    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format for the resolved topology
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_none() && self.config.is_none() {
            return Err("either --endpoint or --config must be given".to_string());
        }

        if self.quiet && self.verbose {
            return Err("--quiet and --verbose are mutually exclusive".to_string());
        }

        if self.cluster_timeout_ms == Some(0) {
            return Err("--cluster-timeout-ms must be at least 1".to_string());
        }

        Ok(())
    }
}
