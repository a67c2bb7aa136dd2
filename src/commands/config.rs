//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("isilon-exporter.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Isilon Disk Exporter Configuration
# ==================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 9300                   # HTTP port
# log_level: "info"            # off, error, warn, info, debug, trace
#
# Cluster Connection
# ------------------
# cluster_url: "https://cluster.example.com:8080"  # OneFS platform API (required)
# username: "monitor"          # API user
# password: null               # API password (or use password_file)
# password_file: null          # File containing the API password
# insecure: false              # Accept invalid TLS certificates
# timeout_seconds: 30          # Stats API request timeout
#
# Metric Naming
# -------------
# namespace: "isilon"          # Metric name prefix
# cluster_name: null           # Adds constant label cluster="<name>"
# const_labels: {}             # Extra constant labels, e.g. {site: ams}
#
# Collectors
# ----------
# collectors:
#   disk: true                 # Node disk busy/queue/transfer statistics
"#;

    format!("{comments}\n{yaml}")
}
