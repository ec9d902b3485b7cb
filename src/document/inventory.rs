use super::{lenient_string, require};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One storage system from a customer's system list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(deserialize_with = "lenient_string", default)]
    pub hostname: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub platform_type: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub system_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub serial_number: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub model: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub operating_mode: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub version: String,
}

impl InventoryRecord {
    /// Decode `{ "results": [ ... ] }`.
    pub fn decode_list(document: &Value) -> Result<Vec<Self>> {
        let results = require(document, "results", "inventory")?;
        serde_json::from_value(results.clone())
            .map_err(|e| Error::decode("inventory", e.to_string()))
    }
}

/// A customer returned by the name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMatch {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub count: String,
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
}

impl CustomerMatch {
    pub fn decode_list(document: &Value) -> Result<Vec<Self>> {
        let results = require(document, "results", "customer search")?;
        serde_json::from_value(results.clone())
            .map_err(|e| Error::decode("customer search", e.to_string()))
    }
}
