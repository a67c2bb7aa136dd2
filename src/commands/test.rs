//! Test command implementation.
//!
//! Runs one collection cycle against the cluster and prints the result.

use isilon_disk_exporter::{scrape, CollectorRegistry, DiskCollector, MetricSample};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::config::Config;

/// Runs a single collection, optionally restricted to one disk stat key.
pub async fn command_test(
    key: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Isilon Disk Exporter - Test Mode");
    println!("===================================");

    let ctx = config.collector_context()?;
    let start = Instant::now();

    if let Some(key) = key {
        let collector = DiskCollector::new(&ctx)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<MetricSample>();
        collector.update_key(&key, &tx).await?;
        drop(tx);

        let mut count = 0usize;
        while let Some(sample) = rx.recv().await {
            println!(
                "   ├─ {}{{node=\"{}\",disk=\"{}\"}} {}",
                sample.descriptor.fq_name(),
                sample.node,
                sample.disk,
                sample.value
            );
            count += 1;
        }
        println!("   📊 {} samples for {}", count, key);
    } else {
        let collectors = CollectorRegistry::builtin().build(&ctx, &config.collector_overrides())?;
        let result = scrape::collect_all(&collectors, config.namespace()).await?;
        print!("{}", scrape::encode_text(&result.families)?);

        for outcome in &result.outcomes {
            let mark = if outcome.success { "✅" } else { "❌" };
            println!(
                "{} {}: {} samples in {:.3}s",
                mark, outcome.name, outcome.samples, outcome.duration_seconds
            );
        }
        if result.outcomes.iter().any(|o| !o.success) {
            return Err("one or more collectors failed".into());
        }
    }

    println!(
        "\n✅ Test completed in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
