//! Per-node efficiency fan-out
//!
//! One task per node fetches that node's efficiency document. At most
//! `max_concurrent` fetches run at a time. Workers never touch the result
//! map: each sends its finished record over a channel and a single consumer
//! merges records into a map keyed by serial number, so the final collection
//! is the same whatever order the fetches complete in.
//!
//! A node whose fetch fails is logged, recorded under
//! [`EfficiencyCollection::failures`], and left out of the records.

use crate::aggregate::{self, AggregateResult};
use crate::document::{check_error, ClusterNode, EfficiencyPayload};
use crate::error::{Error, Result};
use crate::source::{Endpoint, SharedSource};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// A node to fetch, plus fields the caller wants carried into its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub serial: String,
    pub enrichment: BTreeMap<String, String>,
}

impl NodeDescriptor {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            enrichment: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.enrichment.insert(key.into(), value.into());
        self
    }
}

impl From<&ClusterNode> for NodeDescriptor {
    fn from(node: &ClusterNode) -> Self {
        NodeDescriptor::new(node.serial.clone())
            .with_field("name", node.name.clone())
            .with_field("model", node.model.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeEfficiencyRecord {
    pub serial_number: String,
    pub hostname: String,
    pub model: String,
    pub efficiency_ratio: f64,
    pub enrichment: BTreeMap<String, String>,
}

impl NodeEfficiencyRecord {
    fn from_payload(node: &NodeDescriptor, payload: &EfficiencyPayload) -> Result<Self> {
        let efficiency_ratio = payload.efficiency_ratio()?;
        let hostname = payload
            .text("hostname")
            .or_else(|| node.enrichment.get("name").cloned())
            .unwrap_or_default();
        let model = node
            .enrichment
            .get("model")
            .filter(|model| !model.is_empty())
            .cloned()
            .or_else(|| payload.text("model"))
            .unwrap_or_default();

        Ok(Self {
            serial_number: node.serial.clone(),
            hostname,
            model,
            efficiency_ratio,
            enrichment: node.enrichment.clone(),
        })
    }

    /// Union `other`'s enrichment into this record. Keys already present
    /// keep their value.
    fn merge(&mut self, other: NodeEfficiencyRecord) {
        for (key, value) in other.enrichment {
            self.enrichment.entry(key).or_insert(value);
        }
    }
}

/// Records and failures of one fan-out, both keyed by serial number.
#[derive(Debug, Default)]
pub struct EfficiencyCollection {
    pub records: BTreeMap<String, NodeEfficiencyRecord>,
    pub failures: BTreeMap<String, Error>,
}

impl EfficiencyCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in serial-number order.
    pub fn records(&self) -> impl Iterator<Item = &NodeEfficiencyRecord> {
        self.records.values()
    }

    /// Mean efficiency ratio; [`Error::EmptyAggregateInput`] if no node
    /// produced a record.
    pub fn mean_efficiency(&self) -> Result<AggregateResult> {
        aggregate::mean(self.records().map(|record| record.efficiency_ratio))
    }
}

#[derive(Clone)]
pub struct EfficiencyCollector {
    source: SharedSource,
    max_concurrent: usize,
    timeout: Option<Duration>,
}

impl EfficiencyCollector {
    pub fn new(source: SharedSource, max_concurrent: usize, timeout: Option<Duration>) -> Self {
        Self {
            source,
            max_concurrent: max_concurrent.max(1),
            timeout,
        }
    }

    pub async fn collect(&self, nodes: Vec<NodeDescriptor>) -> EfficiencyCollection {
        let mut collection = EfficiencyCollection::default();
        if nodes.is_empty() {
            info!("No cluster nodes to fetch efficiency for");
            return collection;
        }

        info!(
            "Fetching efficiency for {} nodes, at most {} at a time",
            nodes.len(),
            self.max_concurrent
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel::<(String, Result<NodeEfficiencyRecord>)>(nodes.len());

        let mut handles = Vec::with_capacity(nodes.len());
        for node in nodes {
            let serial = node.serial.clone();
            let source = self.source.clone();
            let semaphore = semaphore.clone();
            let timeout = self.timeout;
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetch_node(source, &node, timeout).await,
                    Err(e) => Err(Error::NodeFetch {
                        serial: node.serial.clone(),
                        message: e.to_string(),
                    }),
                };
                // The receiver lives until every sender is gone.
                let _ = tx.send((node.serial, result)).await;
            });
            handles.push((serial, handle));
        }
        drop(tx);

        while let Some((serial, result)) = rx.recv().await {
            match result {
                Ok(record) => {
                    debug!("Node {} efficiency {}", serial, record.efficiency_ratio);
                    match collection.records.get_mut(&serial) {
                        Some(existing) => existing.merge(record),
                        None => {
                            collection.records.insert(serial, record);
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping node {}: {}", serial, e);
                    collection.failures.insert(serial, e);
                }
            }
        }

        let (serials, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        for (serial, joined) in serials.into_iter().zip(join_all(handles).await) {
            if let Err(e) = joined {
                warn!("Efficiency task for node {} did not finish: {}", serial, e);
                collection.failures.insert(
                    serial.clone(),
                    Error::NodeFetch {
                        serial,
                        message: e.to_string(),
                    },
                );
            }
        }

        info!(
            "Collected efficiency for {} nodes ({} failed)",
            collection.records.len(),
            collection.failures.len()
        );
        collection
    }
}

async fn fetch_node(
    source: SharedSource,
    node: &NodeDescriptor,
    timeout: Option<Duration>,
) -> Result<NodeEfficiencyRecord> {
    let endpoint = Endpoint::NodeEfficiency {
        serial: node.serial.clone(),
    };

    let fetch = source.fetch(&endpoint);
    let document = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetch)
            .await
            .unwrap_or(Err(Error::Timeout(limit))),
        None => fetch.await,
    }
    .map_err(|e| Error::NodeFetch {
        serial: node.serial.clone(),
        message: e.to_string(),
    })?;

    check_error(endpoint.kind(), &document)?;
    let payload = EfficiencyPayload::decode(&document)?;
    NodeEfficiencyRecord::from_payload(node, &payload)
}
