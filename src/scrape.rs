//! Scrape orchestration.
//!
//! Runs every enabled collector once, folds the emitted samples into gauge
//! families and records per-collector duration and success, the same way for
//! the `/metrics` endpoint and the `test` subcommand.

use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::collectors::NamedCollector;

/// Outcome of running a single collector.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorOutcome {
    pub name: &'static str,
    pub success: bool,
    pub samples: usize,
    pub duration_seconds: f64,
}

/// Families gathered in one scrape plus per-collector outcomes.
pub struct ScrapeResult {
    pub families: Vec<MetricFamily>,
    pub outcomes: Vec<CollectorOutcome>,
}

/// Runs all collectors sequentially and gathers their samples.
///
/// A failing collector is recorded with `scrape_collector_success` 0; samples
/// it emitted before failing are still exported.
pub async fn collect_all(
    collectors: &[NamedCollector],
    namespace: &str,
) -> prometheus::Result<ScrapeResult> {
    let registry = Registry::new();

    let duration = GaugeVec::new(
        Opts::new(
            "collector_duration_seconds",
            "Duration of a collector scrape.",
        )
        .namespace(namespace)
        .subsystem("scrape"),
        &["collector"],
    )?;
    let success = GaugeVec::new(
        Opts::new(
            "collector_success",
            "Whether a collector succeeded.",
        )
        .namespace(namespace)
        .subsystem("scrape"),
        &["collector"],
    )?;
    registry.register(Box::new(duration.clone()))?;
    registry.register(Box::new(success.clone()))?;

    let mut gauges: HashMap<String, GaugeVec> = HashMap::new();
    let mut outcomes = Vec::with_capacity(collectors.len());

    for named in collectors {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let result = named.collector.update(&tx).await;
        let elapsed = start.elapsed().as_secs_f64();
        drop(tx);

        let mut samples = 0usize;
        while let Some(sample) = rx.recv().await {
            let vec = match gauges.entry(sample.descriptor.fq_name().to_string()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let vec = sample.descriptor.gauge_vec()?;
                    registry.register(Box::new(vec.clone()))?;
                    e.insert(vec)
                }
            };
            vec.with_label_values(&sample.label_values()).set(sample.value);
            samples += 1;
        }

        duration.with_label_values(&[named.name]).set(elapsed);
        let ok = match result {
            Ok(()) => {
                debug!(
                    "Collector {} succeeded in {:.3}s with {} samples",
                    named.name, elapsed, samples
                );
                true
            }
            Err(e) => {
                error!(
                    "Collector {} failed after {:.3}s: {}",
                    named.name, elapsed, e
                );
                false
            }
        };
        success
            .with_label_values(&[named.name])
            .set(if ok { 1.0 } else { 0.0 });

        outcomes.push(CollectorOutcome {
            name: named.name,
            success: ok,
            samples,
            duration_seconds: elapsed,
        });
    }

    Ok(ScrapeResult {
        families: registry.gather(),
        outcomes,
    })
}

/// Encodes metric families in the Prometheus text exposition format.
pub fn encode_text(families: &[MetricFamily]) -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
