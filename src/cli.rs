//! CLI arguments and subcommands for isilon-disk-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "isilon-disk-exporter",
    about = "Prometheus exporter for Isilon/OneFS node disk statistics",
    long_about = "Prometheus exporter for Isilon/OneFS node disk statistics.\n\n\
                  Queries the OneFS statistics engine on every scrape and exposes per-node, \
                  per-disk busy ratio, I/O scheduler queue depth and transfer rates.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Cluster platform API URL, e.g. https://cluster.example.com:8080
    #[arg(long)]
    pub url: Option<String>,

    /// Username for the platform API
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// File containing the platform API password
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Accept invalid TLS certificates from the cluster
    #[arg(long)]
    pub insecure: bool,

    /// Stats API request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Cluster name, exported as constant label `cluster`
    #[arg(long)]
    pub cluster_name: Option<String>,

    /// Metric namespace prefix
    #[arg(long)]
    pub namespace: Option<String>,

    /// Disable a collector by name (repeatable)
    #[arg(long = "disable-collector", value_name = "NAME")]
    pub disable_collectors: Vec<String>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// List registered collectors and whether they are enabled
    Collectors,

    /// Run one collection cycle against the cluster and print the result
    Test {
        /// Only query this stats key (disk collector)
        #[arg(short = 'k', long)]
        key: Option<String>,
    },
}
