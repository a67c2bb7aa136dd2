//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use isilon_disk_exporter::NamedCollector;
use prometheus::{Counter, Gauge, Registry};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// Long-lived registry for the exporter's own metrics.
    pub registry: Registry,
    pub scrape_duration: Gauge,
    pub scrapes_total: Counter,
    /// Enabled collectors in registration order.
    pub collectors: Vec<NamedCollector>,
    pub config: Arc<Config>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
