//! CLI command implementations for isilon-disk-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `config`: Configuration file generation
//! - `collectors`: Collector listing
//! - `test`: One-shot collection against the cluster

pub mod collectors;
pub mod config;
pub mod test;

// Re-export command functions
pub use collectors::command_collectors;
pub use config::command_config;
pub use test::command_test;
