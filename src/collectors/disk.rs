//! Node disk statistics collector.
//!
//! Queries the stats engine for per-disk busy percentage, I/O scheduler queue
//! depth and transfer rates of every node, and exposes them as gauges
//! labelled by `node` and `disk`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Collector, CollectorContext, MetricSender};
use crate::client::{StatsClient, StatsError};
use crate::descriptor::{DescriptorError, MetricDescriptor, MetricSample};

/// Registration name of this collector.
pub const DISK_COLLECTOR: &str = "disk";

const NODE_SUBSYSTEM: &str = "node";
const DISK_LABELS: [&str; 2] = ["node", "disk"];

/// Disk metrics exported by this collector, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMetric {
    Busy,
    IoschedQueue,
    XfersInRate,
    XfersOutRate,
}

impl DiskMetric {
    pub const ALL: [DiskMetric; 4] = [
        DiskMetric::Busy,
        DiskMetric::IoschedQueue,
        DiskMetric::XfersInRate,
        DiskMetric::XfersOutRate,
    ];

    /// Stats engine key for this metric.
    pub fn stat_key(self) -> &'static str {
        match self {
            DiskMetric::Busy => "node.disk.busy.all",
            DiskMetric::IoschedQueue => "node.disk.iosched.queue.all",
            DiskMetric::XfersInRate => "node.disk.xfers.in.rate.all",
            DiskMetric::XfersOutRate => "node.disk.xfers.out.rate.all",
        }
    }

    /// Looks up the metric for a stats key. Unknown keys yield `None`.
    pub fn from_stat_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.stat_key() == key)
    }

    fn metric_name(self) -> &'static str {
        match self {
            DiskMetric::Busy => "disk_busy_all",
            DiskMetric::IoschedQueue => "disk_iosched_queued_all",
            DiskMetric::XfersInRate => "disk_xfers_in_rate_all",
            DiskMetric::XfersOutRate => "disk_xfers_out_rate_all",
        }
    }

    fn help(self) -> &'static str {
        match self {
            DiskMetric::Busy => "Current disk busy percentage represented in 0.0-1.0.",
            DiskMetric::IoschedQueue => "Current queue depth for IO scheduler.",
            DiskMetric::XfersInRate => "Current disk ingest transfer rate.",
            DiskMetric::XfersOutRate => "Current disk egress transfer rate.",
        }
    }

    /// Converts a raw stats engine value into exported units.
    ///
    /// The stats engine reports busy in tenths; every other metric is already
    /// in exported units.
    pub fn transform(self, raw: f64) -> f64 {
        match self {
            DiskMetric::Busy => raw / 10.0,
            DiskMetric::IoschedQueue | DiskMetric::XfersInRate | DiskMetric::XfersOutRate => raw,
        }
    }
}

/// Collector exposing node disk statistics.
pub struct DiskCollector {
    client: Arc<dyn StatsClient>,
    /// Indexed by `DiskMetric as usize`.
    descriptors: Vec<Arc<MetricDescriptor>>,
}

impl DiskCollector {
    pub fn new(ctx: &CollectorContext) -> Result<Self, DescriptorError> {
        let descriptors = DiskMetric::ALL
            .into_iter()
            .map(|metric| {
                let desc = MetricDescriptor::new(
                    &ctx.namespace,
                    NODE_SUBSYSTEM,
                    metric.metric_name(),
                    metric.help(),
                    &DISK_LABELS,
                    &ctx.const_labels,
                )?;
                Ok(Arc::new(desc))
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;

        Ok(Self {
            client: ctx.client.clone(),
            descriptors,
        })
    }

    pub fn descriptor(&self, metric: DiskMetric) -> &Arc<MetricDescriptor> {
        &self.descriptors[metric as usize]
    }

    /// Collects a single stats key. Keys this collector does not export are
    /// ignored without querying the API.
    pub async fn update_key(&self, key: &str, sink: &MetricSender) -> Result<(), StatsError> {
        match DiskMetric::from_stat_key(key) {
            Some(metric) => self.update_metric(metric, sink).await,
            None => {
                debug!("Ignoring unknown disk stat key {}", key);
                Ok(())
            }
        }
    }

    async fn update_metric(&self, metric: DiskMetric, sink: &MetricSender) -> Result<(), StatsError> {
        let key = metric.stat_key();
        let resp = self
            .client
            .query_stats_multi_val(key)
            .await
            .inspect_err(|e| {
                warn!(
                    "Error attempting to query stats engine with key {}: {}",
                    key, e
                )
            })?;

        let descriptor = self.descriptor(metric);
        let mut emitted = 0usize;

        for record in &resp.stats {
            let node = record.devid.to_string();
            for values in &record.value_set {
                for (disk, raw) in values {
                    let sample = MetricSample {
                        descriptor: descriptor.clone(),
                        node: node.clone(),
                        disk: disk.clone(),
                        value: metric.transform(*raw),
                    };
                    if sink.send(sample).is_err() {
                        debug!("Metric sink closed, dropping remaining {} samples", key);
                        return Ok(());
                    }
                    emitted += 1;
                }
            }
        }

        debug!("Emitted {} samples for {}", emitted, key);
        Ok(())
    }
}

#[async_trait]
impl Collector for DiskCollector {
    async fn update(&self, sink: &MetricSender) -> Result<(), StatsError> {
        for metric in DiskMetric::ALL {
            if sink.is_closed() {
                debug!("Metric sink closed, skipping {}", metric.stat_key());
                break;
            }
            self.update_metric(metric, sink).await?;
        }
        Ok(())
    }
}

/// Registry constructor for the disk collector.
pub fn new_disk_collector(ctx: &CollectorContext) -> Result<Box<dyn Collector>, DescriptorError> {
    Ok(Box::new(DiskCollector::new(ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StatsResponse;
    use std::collections::HashMap;

    struct EmptyClient;

    #[async_trait]
    impl StatsClient for EmptyClient {
        async fn query_stats_multi_val(&self, _key: &str) -> Result<StatsResponse, StatsError> {
            Ok(StatsResponse::default())
        }
    }

    fn collector() -> DiskCollector {
        DiskCollector::new(&CollectorContext {
            namespace: "isilon".into(),
            const_labels: HashMap::new(),
            client: Arc::new(EmptyClient),
        })
        .unwrap()
    }

    #[test]
    fn test_busy_transform_divides_by_ten() {
        assert_eq!(DiskMetric::Busy.transform(450.0), 45.0);
        assert_eq!(DiskMetric::Busy.transform(1000.0), 100.0);
        assert_eq!(DiskMetric::Busy.transform(0.0), 0.0);
        assert_eq!(DiskMetric::Busy.transform(-1.0), -0.1);
    }

    #[test]
    fn test_other_transforms_are_identity() {
        for metric in [
            DiskMetric::IoschedQueue,
            DiskMetric::XfersInRate,
            DiskMetric::XfersOutRate,
        ] {
            for raw in [0.0, 3.25, -7.0, 1.0e12, f64::MIN_POSITIVE] {
                assert_eq!(metric.transform(raw).to_bits(), raw.to_bits());
            }
        }
    }

    #[test]
    fn test_stat_key_lookup() {
        for metric in DiskMetric::ALL {
            assert_eq!(DiskMetric::from_stat_key(metric.stat_key()), Some(metric));
        }
        assert_eq!(DiskMetric::from_stat_key("node.disk.unknown.all"), None);
        assert_eq!(DiskMetric::from_stat_key(""), None);
    }

    #[test]
    fn test_descriptor_names() {
        let c = collector();
        assert_eq!(
            c.descriptor(DiskMetric::Busy).fq_name(),
            "isilon_node_disk_busy_all"
        );
        assert_eq!(
            c.descriptor(DiskMetric::IoschedQueue).fq_name(),
            "isilon_node_disk_iosched_queued_all"
        );
        assert_eq!(
            c.descriptor(DiskMetric::XfersInRate).fq_name(),
            "isilon_node_disk_xfers_in_rate_all"
        );
        assert_eq!(
            c.descriptor(DiskMetric::XfersOutRate).fq_name(),
            "isilon_node_disk_xfers_out_rate_all"
        );
        for metric in DiskMetric::ALL {
            assert_eq!(c.descriptor(metric).variable_labels(), ["node", "disk"]);
        }
    }
}
