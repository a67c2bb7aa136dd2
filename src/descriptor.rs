//! Metric descriptors and the samples emitted against them.

use prometheus::core::Describer;
use prometheus::{GaugeVec, Opts};
use std::collections::HashMap;
use std::sync::Arc;

/// Error raised when a descriptor is built from invalid names or labels.
#[derive(Debug, thiserror::Error)]
#[error("invalid metric descriptor {name}: {source}")]
pub struct DescriptorError {
    pub name: String,
    #[source]
    pub source: prometheus::Error,
}

/// Immutable definition of one exported metric.
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    fq_name: String,
    opts: Opts,
}

impl MetricDescriptor {
    /// Builds and validates a descriptor named `namespace_subsystem_name`.
    pub fn new(
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        variable_labels: &[&str],
        const_labels: &HashMap<String, String>,
    ) -> Result<Self, DescriptorError> {
        let opts = Opts::new(name, help)
            .namespace(namespace)
            .subsystem(subsystem)
            .const_labels(const_labels.clone())
            .variable_labels(variable_labels.iter().map(|l| l.to_string()).collect());
        let fq_name = opts.fq_name();

        opts.describe().map_err(|source| DescriptorError {
            name: fq_name.clone(),
            source,
        })?;

        Ok(Self { fq_name, opts })
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.opts.help
    }

    pub fn variable_labels(&self) -> &[String] {
        &self.opts.variable_labels
    }

    pub fn const_labels(&self) -> &HashMap<String, String> {
        &self.opts.const_labels
    }

    /// Creates an empty gauge vector carrying this descriptor's labels.
    pub fn gauge_vec(&self) -> prometheus::Result<GaugeVec> {
        let labels: Vec<&str> = self
            .opts
            .variable_labels
            .iter()
            .map(String::as_str)
            .collect();
        GaugeVec::new(self.opts.clone(), &labels)
    }
}

/// One gauge value emitted by a collector for a (node, disk) pair.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub descriptor: Arc<MetricDescriptor>,
    pub node: String,
    pub disk: String,
    pub value: f64,
}

impl MetricSample {
    /// Label values in descriptor order (`node`, `disk`).
    pub fn label_values(&self) -> [&str; 2] {
        [self.node.as_str(), self.disk.as_str()]
    }
}
