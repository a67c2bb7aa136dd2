//! Configuration management for isilon-disk-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use isilon_disk_exporter::{ClientOptions, CollectorContext, CollectorRegistry, IsiClient};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9300;
pub const DEFAULT_NAMESPACE: &str = "isilon";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Constant label carrying `cluster_name`.
pub const CLUSTER_LABEL: &str = "cluster";

const REDACTED: &str = "********";

static LABEL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid label regex"));
static NAMESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("valid namespace regex"));

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Metric naming
    pub namespace: Option<String>,
    #[serde(alias = "cluster-name")]
    pub cluster_name: Option<String>,

    // Cluster connection
    #[serde(alias = "cluster-url", alias = "url")]
    pub cluster_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "password-file")]
    pub password_file: Option<PathBuf>,
    pub insecure: Option<bool>,
    #[serde(alias = "timeout-seconds")]
    pub timeout_seconds: Option<u64>,

    /// Extra constant labels added to every disk metric
    #[serde(default, alias = "const-labels")]
    pub const_labels: BTreeMap<String, String>,

    /// Per-collector enable overrides (name -> enabled)
    #[serde(default)]
    pub collectors: BTreeMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            log_level: Some("info".into()),
            namespace: Some(DEFAULT_NAMESPACE.into()),
            cluster_name: None,
            cluster_url: None,
            username: None,
            password: None,
            password_file: None,
            insecure: Some(false),
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            const_labels: BTreeMap::new(),
            collectors: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Constant labels for collector descriptors, including `cluster`.
    pub fn const_labels_map(&self) -> HashMap<String, String> {
        let mut labels: HashMap<String, String> = self
            .const_labels
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(name) = self.cluster_name.as_deref().filter(|n| !n.is_empty()) {
            labels.insert(CLUSTER_LABEL.to_string(), name.to_string());
        }
        labels
    }

    pub fn collector_overrides(&self) -> HashMap<String, bool> {
        self.collectors
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Resolves the API password from `password` or `password_file`.
    pub fn resolve_password(&self) -> Result<Option<String>, Box<dyn std::error::Error>> {
        if let Some(password) = &self.password {
            return Ok(Some(password.clone()));
        }
        match &self.password_file {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    format!("Failed to read password file {}: {}", path.display(), e)
                })?;
                Ok(Some(content.trim_end_matches(['\r', '\n']).to_string()))
            }
            None => Ok(None),
        }
    }

    /// Builds the stats API client and the shared collector inputs.
    pub fn collector_context(&self) -> Result<CollectorContext, Box<dyn std::error::Error>> {
        let client = IsiClient::new(ClientOptions {
            base_url: self.cluster_url.clone().unwrap_or_default(),
            username: self.username.clone(),
            password: self.resolve_password()?,
            insecure: self.insecure.unwrap_or(false),
            timeout: self.timeout(),
        })?;

        Ok(CollectorContext {
            namespace: self.namespace().to_string(),
            const_labels: self.const_labels_map(),
            client: Arc::new(client),
        })
    }

    /// Copy with secrets replaced, for display.
    pub fn redacted(&self) -> Config {
        let mut cfg = self.clone();
        if cfg.password.is_some() {
            cfg.password = Some(REDACTED.to_string());
        }
        cfg
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.port == Some(0) {
        return Err("port must be between 1 and 65535".into());
    }

    // Cluster URL
    match cfg.cluster_url.as_deref().map(str::trim) {
        None | Some("") => {
            return Err("cluster_url is not set (use --url or cluster_url in the config file)".into());
        }
        Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => {
            return Err(format!(
                "Invalid cluster_url '{}', expected an http:// or https:// URL",
                url
            )
            .into());
        }
        Some(_) => {}
    }

    // Credentials
    if cfg.password.is_some() && cfg.password_file.is_some() {
        return Err("Only one of password and password_file may be set".into());
    }
    if cfg.username.is_some() && cfg.password.is_none() && cfg.password_file.is_none() {
        return Err("username is set but neither password nor password_file are set".into());
    }
    if cfg.username.is_none() && (cfg.password.is_some() || cfg.password_file.is_some()) {
        return Err("password or password_file is set but username is not set".into());
    }
    if let Some(path) = &cfg.password_file {
        if !path.exists() {
            return Err(format!("Password file not found: {}", path.display()).into());
        }
    }

    if cfg.timeout_seconds == Some(0) {
        return Err("timeout_seconds must be greater than 0".into());
    }

    // Metric naming
    if !NAMESPACE_RE.is_match(cfg.namespace()) {
        return Err(format!("Invalid namespace '{}'", cfg.namespace()).into());
    }
    for name in cfg.const_labels.keys() {
        if !LABEL_NAME_RE.is_match(name) || name.starts_with("__") {
            return Err(format!("Invalid constant label name '{}'", name).into());
        }
        if name == "node" || name == "disk" {
            return Err(format!(
                "Constant label '{}' collides with a disk metric label",
                name
            )
            .into());
        }
    }
    if cfg.cluster_name.is_some() && cfg.const_labels.contains_key(CLUSTER_LABEL) {
        return Err("cluster_name and const_labels.cluster are both set".into());
    }

    // Collectors
    let registry = CollectorRegistry::builtin();
    for name in cfg.collectors.keys() {
        if !registry.contains(name) {
            return Err(format!("Unknown collector '{}' in collectors", name).into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{:?}", level).to_lowercase());
    }

    // Cluster connection
    if let Some(url) = &args.url {
        config.cluster_url = Some(url.clone());
    }
    if let Some(username) = &args.username {
        config.username = Some(username.clone());
    }
    if let Some(password_file) = &args.password_file {
        config.password_file = Some(password_file.clone());
        config.password = None;
    }
    if args.insecure {
        config.insecure = Some(true);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_seconds = Some(timeout);
    }

    // Metric naming
    if let Some(name) = &args.cluster_name {
        config.cluster_name = Some(name.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.namespace = Some(namespace.clone());
    }

    for name in &args.disable_collectors {
        config.collectors.insert(name.clone(), false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/isilon-exporter/config.yaml",
            "/etc/isilon-exporter/config.yml",
            "/etc/isilon-exporter/config.json",
            "./isilon-exporter.yaml",
            "./isilon-exporter.yml",
            "./isilon-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, path.extension().and_then(|s| s.to_str()))?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content; the extension selects the format, YAML by default.
pub fn parse_config(
    content: &str,
    extension: Option<&str>,
) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match extension {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in the requested format
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format, with secrets redacted
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(&config.redacted(), &format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_config() -> Config {
        Config {
            cluster_url: Some("https://cluster.example.com:8080".into()),
            username: Some("monitor".into()),
            password: Some("secret".into()),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_requires_cluster_url() {
        let err = validate_effective_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("cluster_url is not set"));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_effective_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_url_scheme() {
        let cfg = Config {
            cluster_url: Some("cluster.example.com".into()),
            ..valid_config()
        };
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Invalid cluster_url"));
    }

    #[test]
    fn test_password_sources_are_exclusive() {
        let cfg = Config {
            password_file: Some(PathBuf::from("/tmp/pw")),
            ..valid_config()
        };
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Only one of password"));

        let cfg = Config {
            password: None,
            ..valid_config()
        };
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("username is set"));
    }

    #[test]
    fn test_password_without_username_rejected() {
        let cfg = Config {
            username: None,
            ..valid_config()
        };
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("username is not set"));

        let cfg = Config {
            username: None,
            password: None,
            ..valid_config()
        };
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_const_label_validation() {
        let mut cfg = valid_config();
        cfg.const_labels.insert("site".into(), "ams".into());
        assert!(validate_effective_config(&cfg).is_ok());

        cfg.const_labels.insert("bad-name".into(), "x".into());
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = valid_config();
        cfg.const_labels.insert("node".into(), "x".into());
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_unknown_collector_rejected() {
        let mut cfg = valid_config();
        cfg.collectors.insert("quota".into(), true);
        let err = validate_effective_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("Unknown collector 'quota'"));
    }

    #[test]
    fn test_const_labels_map_adds_cluster() {
        let mut cfg = valid_config();
        cfg.cluster_name = Some("prod01".into());
        cfg.const_labels.insert("site".into(), "ams".into());

        let labels = cfg.const_labels_map();
        assert_eq!(labels.get("cluster").map(String::as_str), Some("prod01"));
        assert_eq!(labels.get("site").map(String::as_str), Some("ams"));
    }

    #[test]
    fn test_resolve_password_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "hunter2").unwrap();

        let cfg = Config {
            password: None,
            password_file: Some(file.path().to_path_buf()),
            ..valid_config()
        };
        assert_eq!(cfg.resolve_password().unwrap().as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_parse_yaml_with_aliases() {
        let yaml = r#"
port: 9400
cluster-url: https://10.0.0.1:8080
username: monitor
password: secret
cluster-name: prod01
collectors:
  disk: false
"#;
        let cfg = parse_config(yaml, Some("yaml")).unwrap();
        assert_eq!(cfg.port, Some(9400));
        assert_eq!(cfg.cluster_url.as_deref(), Some("https://10.0.0.1:8080"));
        assert_eq!(cfg.cluster_name.as_deref(), Some("prod01"));
        assert_eq!(cfg.collector_overrides().get("disk"), Some(&false));
        // Unset fields are None when loaded from a file
        assert_eq!(cfg.namespace(), DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_render_toml_and_json() {
        let mut cfg = valid_config();
        cfg.const_labels.insert("site".into(), "ams".into());

        let toml_out = render_config(&cfg, &ConfigFormat::Toml).unwrap();
        assert!(toml_out.contains("cluster_url"));
        let back = parse_config(&toml_out, Some("toml")).unwrap();
        assert_eq!(back.const_labels.get("site").map(String::as_str), Some("ams"));

        let json_out = render_config(&cfg, &ConfigFormat::Json).unwrap();
        assert!(json_out.contains("\"port\": 9300"));
    }

    #[test]
    fn test_redacted_hides_password() {
        let shown = valid_config().redacted();
        assert_eq!(shown.password.as_deref(), Some(REDACTED));
    }
}
