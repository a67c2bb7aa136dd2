//! Collectors for cluster metrics.
//!
//! A collector queries the stats API once per scrape and emits samples into a
//! caller-owned channel. Collectors are registered by name in a
//! `CollectorRegistry`, which the exporter builds once at start-up.

pub mod disk;

use anyhow::{bail, Context};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::client::{StatsClient, StatsError};
use crate::descriptor::{DescriptorError, MetricSample};

/// Collectors registered with this flag are enabled unless overridden.
pub const DEFAULT_ENABLED: bool = true;
pub const DEFAULT_DISABLED: bool = false;

/// Write side of the per-scrape sample channel.
pub type MetricSender = UnboundedSender<MetricSample>;

/// A source of metric samples, invoked once per scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Runs one collection cycle, sending every sample to `sink`.
    async fn update(&self, sink: &MetricSender) -> Result<(), StatsError>;
}

/// Shared inputs handed to collector constructors.
#[derive(Clone)]
pub struct CollectorContext {
    pub namespace: String,
    pub const_labels: HashMap<String, String>,
    pub client: Arc<dyn StatsClient>,
}

/// Constructor stored in the registry.
pub type CollectorFactory = fn(&CollectorContext) -> Result<Box<dyn Collector>, DescriptorError>;

/// One entry of the registration table.
#[derive(Clone)]
pub struct CollectorRegistration {
    pub name: &'static str,
    pub default_enabled: bool,
    factory: CollectorFactory,
}

impl CollectorRegistration {
    /// Effective enabled state after applying per-name overrides.
    pub fn is_enabled(&self, overrides: &HashMap<String, bool>) -> bool {
        overrides
            .get(self.name)
            .copied()
            .unwrap_or(self.default_enabled)
    }
}

/// A constructed collector with the name it was registered under.
pub struct NamedCollector {
    pub name: &'static str,
    pub collector: Box<dyn Collector>,
}

/// Table of known collectors, keyed by name, in registration order.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    entries: Vec<CollectorRegistration>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every collector shipped with the exporter.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.entries.push(CollectorRegistration {
            name: disk::DISK_COLLECTOR,
            default_enabled: DEFAULT_ENABLED,
            factory: disk::new_disk_collector,
        });
        registry
    }

    /// Adds a collector. Names must be unique.
    pub fn register(
        &mut self,
        name: &'static str,
        default_enabled: bool,
        factory: CollectorFactory,
    ) -> anyhow::Result<()> {
        if self.contains(name) {
            bail!("collector '{}' is already registered", name);
        }
        self.entries.push(CollectorRegistration {
            name,
            default_enabled,
            factory,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn entries(&self) -> &[CollectorRegistration] {
        &self.entries
    }

    /// Constructs every enabled collector, in registration order.
    pub fn build(
        &self,
        ctx: &CollectorContext,
        overrides: &HashMap<String, bool>,
    ) -> anyhow::Result<Vec<NamedCollector>> {
        let mut collectors = Vec::new();

        for entry in &self.entries {
            if !entry.is_enabled(overrides) {
                debug!("Collector {} disabled", entry.name);
                continue;
            }

            let collector = (entry.factory)(ctx)
                .with_context(|| format!("failed to initialize collector '{}'", entry.name))?;
            debug!("Collector {} initialized", entry.name);

            collectors.push(NamedCollector {
                name: entry.name,
                collector,
            });
        }

        Ok(collectors)
    }
}
