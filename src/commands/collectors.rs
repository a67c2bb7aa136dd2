//! Collectors command implementation.
//!
//! Lists registered collectors and their effective enabled state.

use isilon_disk_exporter::{CollectorRegistry, DiskMetric};

use crate::config::Config;

/// Lists registered collectors, applying config overrides.
pub fn command_collectors(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("📊 Isilon Disk Exporter - Registered Collectors");
    println!("===============================================");

    let registry = CollectorRegistry::builtin();
    let overrides = config.collector_overrides();

    for entry in registry.entries() {
        let state = if entry.is_enabled(&overrides) {
            "enabled"
        } else {
            "disabled"
        };
        let default = if entry.default_enabled {
            "default on"
        } else {
            "default off"
        };
        println!("\n🏷️  {} ({}, {})", entry.name, state, default);

        if entry.name == isilon_disk_exporter::collectors::disk::DISK_COLLECTOR {
            for metric in DiskMetric::ALL {
                println!("   ├─ {}", metric.stat_key());
            }
        }
    }

    println!("\n📋 Total: {} collectors", registry.entries().len());
    Ok(())
}
