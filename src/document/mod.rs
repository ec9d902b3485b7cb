//! Typed views of the JSON documents returned by the Active IQ API
//!
//! Every document is checked for a top-level error indicator exactly once,
//! at the fetch boundary, by [`check_error`]. The decoders in the submodules
//! only ever see payload documents.

pub mod capacity;
pub mod cluster;
pub mod inventory;
pub mod performance;

pub use capacity::{CapacityCategory, CapacityDocument, CapacityRecord, DetailGroup};
pub use cluster::{ClusterNode, ClusterSummary, EfficiencyPayload};
pub use inventory::{CustomerMatch, InventoryRecord};
pub use performance::{CpuBusy, DiskBusy, NoDataNode, PerformanceSection, UnbalancedNode};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reject documents that carry `message` or `errors` at the top level.
pub fn check_error(query: &str, document: &Value) -> Result<()> {
    let Some(object) = document.as_object() else {
        return Ok(());
    };

    if let Some(message) = object.get("message") {
        return Err(Error::remote_query(query, display_value(message)));
    }

    if let Some(errors) = object.get("errors") {
        let message = match errors {
            Value::Array(entries) => entries
                .iter()
                .map(|entry| {
                    entry
                        .get("message")
                        .map(display_value)
                        .unwrap_or_else(|| display_value(entry))
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => display_value(other),
        };
        return Err(Error::remote_query(query, message));
    }

    Ok(())
}

/// Render a scalar without JSON quoting; `72` stays `72`, `"a"` becomes `a`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Read a number that the API may send either as a JSON number or a string.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Take `document[key]`, failing with a decode error naming `document_kind`.
pub(crate) fn require<'a>(document: &'a Value, key: &str, document_kind: &str) -> Result<&'a Value> {
    document
        .get(key)
        .ok_or_else(|| Error::decode(document_kind, format!("missing '{}'", key)))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(display_value(&value))
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_f64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {}", value)))
}

pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}
