//! Report pipelines
//!
//! Each report fetches its documents through the [`ResourceFetcher`], decodes
//! them once, and hands plain values to the correlation, classification and
//! aggregation stages. An error document on any query aborts the report.

pub mod utilization;

pub use utilization::{utilization_findings, UtilizationFinding};

use crate::aggregate::AggregateResult;
use crate::classify::{self, ForecastEntry};
use crate::config::AiqConfig;
use crate::correlate::{correlate_inventory, CorrelatedInventoryRecord};
use crate::document::{
    CapacityDocument, ClusterNode, ClusterSummary, CustomerMatch, InventoryRecord,
    PerformanceSection,
};
use crate::efficiency::{EfficiencyCollector, NodeDescriptor, NodeEfficiencyRecord};
use crate::error::{Error, Result};
use crate::fetch::ResourceFetcher;
use crate::source::{Endpoint, SharedSource};
use serde::Serialize;
use tracing::info;

/// Mean efficiency, or the explicit absence of any node data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EfficiencyOutcome {
    Mean(AggregateResult),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterEfficiencyReport {
    pub summary: ClusterSummary,
    /// Nodes with efficiency data, ordered by serial number.
    pub nodes: Vec<NodeEfficiencyRecord>,
    pub outcome: EfficiencyOutcome,
    /// `(serial, reason)` for nodes whose fetch failed.
    pub failures: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct Reporter {
    fetcher: ResourceFetcher,
    collector: EfficiencyCollector,
}

impl Reporter {
    pub fn new(source: SharedSource, config: &AiqConfig) -> Self {
        let timeout = config.request_timeout();
        Self {
            fetcher: ResourceFetcher::new(source.clone(), timeout),
            collector: EfficiencyCollector::new(source, config.max_concurrent_fetches, timeout),
        }
    }

    pub async fn customer_search(&self, name: &str) -> Result<Vec<CustomerMatch>> {
        let mut results = self
            .fetcher
            .fetch([(
                "search",
                Endpoint::CustomerSearch {
                    name: name.to_string(),
                },
            )])
            .await;
        CustomerMatch::decode_list(&results.take("search")?)
    }

    /// Inventory joined with capacity by serial number.
    pub async fn inventory(&self, customer_id: &str) -> Result<Vec<CorrelatedInventoryRecord>> {
        let mut results = self
            .fetcher
            .fetch([
                (
                    "inventory",
                    Endpoint::SystemList {
                        customer_id: customer_id.to_string(),
                    },
                ),
                (
                    "capacity",
                    Endpoint::CapacityDetails {
                        customer_id: customer_id.to_string(),
                    },
                ),
            ])
            .await;

        let inventory = InventoryRecord::decode_list(&results.take("inventory")?)?;
        let capacity = CapacityDocument::decode(&results.take("capacity")?)?;
        info!(
            "Correlating {} systems against {} capacity records",
            inventory.len(),
            capacity.records().count()
        );
        Ok(correlate_inventory(&inventory, &capacity))
    }

    /// Capacity records at or above `threshold`, labelled by forecast bucket.
    pub async fn capacity_over_threshold(
        &self,
        customer_id: &str,
        threshold: f64,
    ) -> Result<Vec<ForecastEntry>> {
        let capacity = self.capacity(customer_id).await?;
        Ok(classify::filter_and_label(capacity.records(), threshold))
    }

    /// Every capacity record, labelled and sorted ascending by percent.
    pub async fn forecast(&self, customer_id: &str) -> Result<Vec<ForecastEntry>> {
        let capacity = self.capacity(customer_id).await?;
        Ok(classify::forecast(capacity.records()))
    }

    pub async fn utilization(
        &self,
        customer_id: &str,
        threshold: f64,
    ) -> Result<Vec<UtilizationFinding>> {
        let mut results = self
            .fetcher
            .fetch([(
                "performance",
                Endpoint::PerformanceSummary {
                    customer_id: customer_id.to_string(),
                },
            )])
            .await;
        let sections = PerformanceSection::decode_summary(&results.take("performance")?)?;
        Ok(utilization_findings(&sections, threshold))
    }

    /// Summary and resolver in parallel, then one efficiency fetch per node.
    pub async fn cluster_efficiency(&self, cluster_id: &str) -> Result<ClusterEfficiencyReport> {
        let mut results = self
            .fetcher
            .fetch([
                (
                    "summary",
                    Endpoint::ClusterSummary {
                        cluster_id: cluster_id.to_string(),
                    },
                ),
                (
                    "resolver",
                    Endpoint::ClusterResolver {
                        cluster_id: cluster_id.to_string(),
                    },
                ),
            ])
            .await;

        let summary = ClusterSummary::decode(&results.take("summary")?)?;
        let nodes = ClusterNode::decode_resolver(&results.take("resolver")?)?;
        info!("Cluster {} resolved to {} nodes", cluster_id, nodes.len());

        let descriptors = nodes.iter().map(NodeDescriptor::from).collect();
        let collection = self.collector.collect(descriptors).await;

        let outcome = match collection.mean_efficiency() {
            Ok(mean) => EfficiencyOutcome::Mean(mean),
            Err(Error::EmptyAggregateInput) => EfficiencyOutcome::NoData,
            Err(e) => return Err(e),
        };

        Ok(ClusterEfficiencyReport {
            summary,
            nodes: collection.records().cloned().collect(),
            outcome,
            failures: collection
                .failures
                .iter()
                .map(|(serial, error)| (serial.clone(), error.to_string()))
                .collect(),
        })
    }

    async fn capacity(&self, customer_id: &str) -> Result<CapacityDocument> {
        let mut results = self
            .fetcher
            .fetch([(
                "capacity",
                Endpoint::CapacityDetails {
                    customer_id: customer_id.to_string(),
                },
            )])
            .await;
        CapacityDocument::decode(&results.take("capacity")?)
    }
}
