//! Shared helpers for integration tests: an in-memory stats client.

#![allow(dead_code)]

use async_trait::async_trait;
use isilon_disk_exporter::{
    CollectorContext, MetricSample, StatRecord, StatsClient, StatsError, StatsResponse,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

pub const BUSY: &str = "node.disk.busy.all";
pub const QUEUE: &str = "node.disk.iosched.queue.all";
pub const XFERS_IN: &str = "node.disk.xfers.in.rate.all";
pub const XFERS_OUT: &str = "node.disk.xfers.out.rate.all";

/// Canned reply for one stats key.
pub enum Reply {
    Stats(StatsResponse),
    Fail { status: u16, body: &'static str },
}

/// Stats client answering from a fixed table and recording every query.
#[derive(Default)]
pub struct FakeStatsClient {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
}

impl FakeStatsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(mut self, key: &str, response: StatsResponse) -> Self {
        self.replies.insert(key.to_string(), Reply::Stats(response));
        self
    }

    pub fn with_failure(mut self, key: &str, status: u16, body: &'static str) -> Self {
        self.replies
            .insert(key.to_string(), Reply::Fail { status, body });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatsClient for FakeStatsClient {
    async fn query_stats_multi_val(&self, key: &str) -> Result<StatsResponse, StatsError> {
        self.calls.lock().unwrap().push(key.to_string());
        match self.replies.get(key) {
            Some(Reply::Stats(resp)) => Ok(resp.clone()),
            Some(Reply::Fail { status, body }) => Err(StatsError::Status {
                status: *status,
                body: body.to_string(),
            }),
            None => Ok(StatsResponse::default()),
        }
    }
}

/// Builds a response from `(devid, [(disk, value)])` records, one value map each.
pub fn response(records: &[(i64, &[(&str, f64)])]) -> StatsResponse {
    StatsResponse {
        stats: records
            .iter()
            .map(|(devid, values)| StatRecord {
                devid: *devid,
                value_set: vec![values
                    .iter()
                    .map(|(disk, v)| (disk.to_string(), *v))
                    .collect::<BTreeMap<_, _>>()],
                ..StatRecord::default()
            })
            .collect(),
    }
}

pub fn context(client: Arc<FakeStatsClient>) -> CollectorContext {
    CollectorContext {
        namespace: "isilon".into(),
        const_labels: HashMap::new(),
        client,
    }
}

/// Collects everything currently queued in the channel.
pub fn drain(rx: &mut UnboundedReceiver<MetricSample>) -> Vec<MetricSample> {
    let mut samples = Vec::new();
    while let Ok(sample) = rx.try_recv() {
        samples.push(sample);
    }
    samples
}
