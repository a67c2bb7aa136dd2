//! OneFS statistics API client.
//!
//! This module defines the `StatsClient` seam used by collectors, the response
//! types returned by `/platform/1/statistics/current`, and `IsiClient`, the
//! HTTP implementation used in production.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Path of the current-statistics endpoint on the platform API.
const STATS_CURRENT_PATH: &str = "/platform/1/statistics/current";

/// Error returned by a stats query.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("request to stats API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("stats API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode stats API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result of one multi-value stats query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub stats: Vec<StatRecord>,
}

/// Per-node record of a stats response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    /// Node device id.
    pub devid: i64,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Disk id to value mappings. OneFS sends `null` for nodes without data.
    #[serde(rename = "value", default, deserialize_with = "null_as_empty")]
    pub value_set: Vec<BTreeMap<String, f64>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<BTreeMap<String, f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<BTreeMap<String, f64>>>::deserialize(deserializer)?.unwrap_or_default())
}

impl StatsResponse {
    /// Total number of (node, disk) values across all records.
    pub fn value_count(&self) -> usize {
        self.stats
            .iter()
            .flat_map(|record| record.value_set.iter())
            .map(BTreeMap::len)
            .sum()
    }
}

/// Client able to query the cluster statistics engine.
#[async_trait]
pub trait StatsClient: Send + Sync {
    /// Queries a multi-value stat for all nodes.
    async fn query_stats_multi_val(&self, key: &str) -> Result<StatsResponse, StatsError>;
}

/// Connection settings for `IsiClient`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure: bool,
    pub timeout: Duration,
}

/// HTTP client for the OneFS platform API.
pub struct IsiClient {
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    http: reqwest::Client,
}

impl IsiClient {
    pub fn new(options: ClientOptions) -> Result<Self, StatsError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(options.insecure)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            base_url: options.base_url.trim_end_matches('/').to_string(),
            username: options.username,
            password: options.password,
            http,
        })
    }

    /// URL of the current-statistics endpoint, without query parameters.
    pub fn stats_url(&self) -> String {
        format!("{}{}", self.base_url, STATS_CURRENT_PATH)
    }

    /// Request for `key` across all nodes, with credentials attached.
    fn stats_request(&self, key: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .get(self.stats_url())
            .query(&[("key", key), ("devid", "all")]);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }
        request
    }
}

#[async_trait]
impl StatsClient for IsiClient {
    #[instrument(skip(self))]
    async fn query_stats_multi_val(&self, key: &str) -> Result<StatsResponse, StatsError> {
        let response = self.stats_request(key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                debug!("Failed to read error body for {} (HTTP {}): {}", key, status, e);
                String::new()
            });
            return Err(StatsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: StatsResponse = serde_json::from_str(&body)?;
        debug!(
            "Stats query for {} returned {} records",
            key,
            parsed.stats.len()
        );
        Ok(parsed)
    }
}
