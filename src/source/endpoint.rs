//! Request descriptors for the Active IQ API

use std::fmt;

/// One remote query, independent of transport and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CustomerSearch { name: String },
    SystemList { customer_id: String },
    CapacityDetails { customer_id: String },
    PerformanceSummary { customer_id: String },
    ClusterSummary { cluster_id: String },
    ClusterResolver { cluster_id: String },
    NodeEfficiency { serial: String },
}

impl Endpoint {
    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::CustomerSearch { .. } => "v1/search/aggregate/level/customer".to_string(),
            Endpoint::SystemList { customer_id } => {
                format!("v1/systemList/aggregate/level/customer/id/{customer_id}")
            }
            Endpoint::CapacityDetails { customer_id } => {
                format!("v2/capacity/details/level/customer/id/{customer_id}")
            }
            Endpoint::PerformanceSummary { customer_id } => {
                format!("v1/performance/summary/level/customer/id/{customer_id}")
            }
            Endpoint::ClusterSummary { cluster_id } => {
                format!("v1/clusterview/get-cluster-summary/{cluster_id}")
            }
            Endpoint::ClusterResolver { cluster_id } => {
                format!("v1/clusterview/resolver/{cluster_id}")
            }
            Endpoint::NodeEfficiency { serial } => {
                format!("v1/efficiency/summary/level/serial_numbers/id/{serial}")
            }
        }
    }

    /// Query string parameters.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::CustomerSearch { name } => vec![("name", name.clone())],
            _ => Vec::new(),
        }
    }

    /// Short name of the query, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::CustomerSearch { .. } => "customer search",
            Endpoint::SystemList { .. } => "inventory",
            Endpoint::CapacityDetails { .. } => "capacity",
            Endpoint::PerformanceSummary { .. } => "performance",
            Endpoint::ClusterSummary { .. } => "cluster summary",
            Endpoint::ClusterResolver { .. } => "cluster resolver",
            Endpoint::NodeEfficiency { .. } => "node efficiency",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind(), self.path())
    }
}
