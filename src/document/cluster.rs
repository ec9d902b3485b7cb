use super::{display_value, lenient_string, require, value_as_f64};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EFFICIENCY_RATIO_FIELD: &str = "node_overall_efficiency_ratio_without_clone_snapshot";

/// Attribute/value pairs of the first entry in a cluster summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClusterSummary {
    pub attributes: Vec<(String, String)>,
}

impl ClusterSummary {
    /// Decode `{ "data": [ { attribute: value, ... } ] }`.
    pub fn decode(document: &Value) -> Result<Self> {
        let data = require(document, "data", "cluster summary")?
            .as_array()
            .ok_or_else(|| Error::decode("cluster summary", "'data' is not a list"))?;

        let attributes = match data.first() {
            Some(Value::Object(entry)) => entry
                .iter()
                .map(|(key, value)| (key.clone(), display_value(value)))
                .collect(),
            Some(_) => {
                return Err(Error::decode(
                    "cluster summary",
                    "'data' entry is not an object",
                ))
            }
            None => Vec::new(),
        };

        Ok(Self { attributes })
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == attribute)
            .map(|(_, value)| value.as_str())
    }
}

/// A node listed by the cluster resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    #[serde(deserialize_with = "lenient_string", default)]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub serial: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub model: String,
}

#[derive(Deserialize)]
struct ResolvedCluster {
    #[serde(default)]
    nodes: Vec<ClusterNode>,
}

impl ClusterNode {
    /// Decode `{ "clusters": [ { "nodes": [...] } ] }`, flattening every
    /// cluster's nodes in document order.
    pub fn decode_resolver(document: &Value) -> Result<Vec<Self>> {
        let clusters = require(document, "clusters", "cluster resolver")?;
        let clusters: Vec<ResolvedCluster> = serde_json::from_value(clusters.clone())
            .map_err(|e| Error::decode("cluster resolver", e.to_string()))?;
        Ok(clusters.into_iter().flat_map(|c| c.nodes).collect())
    }
}

/// First system record of a node efficiency document.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyPayload {
    pub fields: Map<String, Value>,
}

impl EfficiencyPayload {
    /// Decode `efficiency.systems.system[0]`.
    pub fn decode(document: &Value) -> Result<Self> {
        let system = document
            .pointer("/efficiency/systems/system/0")
            .ok_or_else(|| Error::decode("node efficiency", "no system record"))?;
        let fields = system
            .as_object()
            .cloned()
            .ok_or_else(|| Error::decode("node efficiency", "system record is not an object"))?;
        Ok(Self { fields })
    }

    pub fn efficiency_ratio(&self) -> Result<f64> {
        self.fields
            .get(EFFICIENCY_RATIO_FIELD)
            .and_then(value_as_f64)
            .ok_or_else(|| {
                Error::decode(
                    "node efficiency",
                    format!("missing numeric '{}'", EFFICIENCY_RATIO_FIELD),
                )
            })
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .map(display_value)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_summary_keeps_attribute_order() {
        let doc = json!({"data": [{"cluster_name": "prod-a", "node_count": 4, "version": "9.12"}]});
        let summary = ClusterSummary::decode(&doc).unwrap();
        let keys: Vec<_> = summary.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["cluster_name", "node_count", "version"]);
        assert_eq!(summary.get("node_count"), Some("4"));
    }

    #[test]
    fn test_decode_empty_summary() {
        let summary = ClusterSummary::decode(&json!({"data": []})).unwrap();
        assert!(summary.attributes.is_empty());
    }

    #[test]
    fn test_decode_resolver_flattens_clusters() {
        let doc = json!({"clusters": [
            {"nodes": [{"name": "n1", "serial": "A", "model": "AFF-A400"}]},
            {"nodes": [{"name": "n2", "serial": "B", "model": "AFF-A400"}]},
            {}
        ]});
        let nodes = ClusterNode::decode_resolver(&doc).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].serial, "B");
    }

    #[test]
    fn test_efficiency_payload() {
        let doc = json!({"efficiency": {"systems": {"system": [
            {"hostname": "n1", EFFICIENCY_RATIO_FIELD: "1.85"},
            {"hostname": "ignored", EFFICIENCY_RATIO_FIELD: 9.0}
        ]}}});
        let payload = EfficiencyPayload::decode(&doc).unwrap();
        assert_eq!(payload.efficiency_ratio().unwrap(), 1.85);
        assert_eq!(payload.text("hostname").as_deref(), Some("n1"));
    }

    #[test]
    fn test_efficiency_payload_without_systems() {
        let doc = json!({"efficiency": {"systems": {"system": []}}});
        assert!(EfficiencyPayload::decode(&doc).is_err());
    }
}
