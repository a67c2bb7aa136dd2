//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. Every request runs
//! one collection cycle against the cluster; nothing is cached between scrapes.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use isilon_disk_exporter::scrape;
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    CollectionFailed,
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        let message = match self {
            MetricsError::CollectionFailed => "Failed to collect metrics",
            MetricsError::EncodingFailed => "Failed to encode metrics",
        };
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");
    state.scrapes_total.inc();

    let result = scrape::collect_all(&state.collectors, state.config.namespace())
        .await
        .map_err(|e| {
            error!("Failed to assemble collector metrics: {}", e);
            MetricsError::CollectionFailed
        })?;

    // Exporter metrics reflect the previous scrape's duration.
    let mut families = result.families;
    families.extend(state.registry.gather());

    let body = scrape::encode_text(&families).map_err(|e| {
        error!("Failed to encode Prometheus metrics: {}", e);
        MetricsError::EncodingFailed
    })?;

    let elapsed = start.elapsed().as_secs_f64();
    state.scrape_duration.set(elapsed);

    let failed = result.outcomes.iter().filter(|o| !o.success).count();
    debug!(
        "Metrics request completed: {} collectors ({} failed), {} bytes, {:.3}ms",
        result.outcomes.len(),
        failed,
        body.len(),
        elapsed * 1000.0
    );

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use async_trait::async_trait;
    use isilon_disk_exporter::{Collector, MetricSender, NamedCollector, StatsError};
    use prometheus::{Counter, Gauge, Opts, Registry};
    use std::sync::Arc;

    struct FailingCollector;

    #[async_trait]
    impl Collector for FailingCollector {
        async fn update(&self, _sink: &MetricSender) -> Result<(), StatsError> {
            Err(StatsError::Status {
                status: 503,
                body: "stats engine unavailable".into(),
            })
        }
    }

    fn state(collectors: Vec<NamedCollector>) -> SharedState {
        let registry = Registry::new();
        let scrape_duration = Gauge::with_opts(
            Opts::new("exporter_scrape_duration_seconds", "help").namespace("isilon"),
        )
        .unwrap();
        let scrapes_total =
            Counter::with_opts(Opts::new("exporter_scrapes_total", "help").namespace("isilon"))
                .unwrap();
        registry.register(Box::new(scrape_duration.clone())).unwrap();
        registry.register(Box::new(scrapes_total.clone())).unwrap();

        Arc::new(AppState {
            registry,
            scrape_duration,
            scrapes_total,
            collectors,
            config: Arc::new(Config::default()),
            start_time: Instant::now(),
        })
    }

    #[tokio::test]
    async fn test_failing_collector_still_serves_metrics() {
        let state = state(vec![NamedCollector {
            name: "disk",
            collector: Box::new(FailingCollector),
        }]);

        let response = metrics_handler(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = metrics_handler(State(state)).await.unwrap();
        assert!(body.contains(r#"isilon_scrape_collector_success{collector="disk"} 0"#));
        assert!(body.contains("isilon_scrape_collector_duration_seconds{collector=\"disk\"}"));
        assert!(body.contains("isilon_exporter_scrapes_total 2"));
        assert!(body.contains("# TYPE isilon_exporter_scrape_duration_seconds gauge"));
    }

    #[tokio::test]
    async fn test_no_collectors_serves_exporter_metrics_only() {
        let body = metrics_handler(State(state(Vec::new()))).await.unwrap();

        assert!(body.contains("isilon_exporter_scrapes_total 1"));
        assert!(!body.contains("isilon_scrape_collector_success"));
    }
}
