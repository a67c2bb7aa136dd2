//! Isilon Disk Exporter Library
//!
//! This library provides the collection core of the exporter: a client for the
//! OneFS statistics engine, the node disk collector, and the scrape logic that
//! turns collector samples into Prometheus metric families. It is independent
//! of the HTTP server so the collection path can be driven from tests or other
//! front-ends.
//!
//! # Usage
//!
//! ```rust,no_run
//! use isilon_disk_exporter::{ClientOptions, CollectorContext, CollectorRegistry, IsiClient};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IsiClient::new(ClientOptions {
//!     base_url: "https://cluster.example.com:8080".into(),
//!     username: Some("monitor".into()),
//!     password: Some("secret".into()),
//!     insecure: false,
//!     timeout: Duration::from_secs(30),
//! })?;
//!
//! let ctx = CollectorContext {
//!     namespace: "isilon".into(),
//!     const_labels: HashMap::new(),
//!     client: Arc::new(client),
//! };
//!
//! let collectors = CollectorRegistry::builtin().build(&ctx, &HashMap::new())?;
//! let result = isilon_disk_exporter::scrape::collect_all(&collectors, "isilon").await?;
//! print!("{}", isilon_disk_exporter::scrape::encode_text(&result.families)?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collectors;
pub mod descriptor;
pub mod scrape;

// Re-export main types for convenience
pub use client::{ClientOptions, IsiClient, StatRecord, StatsClient, StatsError, StatsResponse};
pub use collectors::disk::{DiskCollector, DiskMetric};
pub use collectors::{
    Collector, CollectorContext, CollectorRegistry, MetricSender, NamedCollector,
};
pub use descriptor::{DescriptorError, MetricDescriptor, MetricSample};
