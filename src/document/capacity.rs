use super::{lenient_f64, lenient_opt_f64, lenient_string, require};
use crate::classify::ForecastBucket;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capacity figures for one system, tagged with the forecast bucket of the
/// category it was listed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub serial_number: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub hostname: String,
    #[serde(
        rename = "used_capacity_GB",
        deserialize_with = "lenient_opt_f64",
        default
    )]
    pub used_capacity_gb: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub percent_capacity: f64,
    #[serde(
        rename = "allocated_capacity_GB",
        deserialize_with = "lenient_opt_f64",
        default
    )]
    pub allocated_capacity_gb: Option<f64>,
    #[serde(skip, default)]
    pub bucket: ForecastBucket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapacityCategory {
    pub key: String,
    pub bucket: ForecastBucket,
    pub records: Vec<CapacityRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailGroup {
    pub name: String,
    pub categories: Vec<CapacityCategory>,
}

/// `capacity -> detail group -> category -> records`, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CapacityDocument {
    pub groups: Vec<DetailGroup>,
}

impl CapacityDocument {
    pub fn decode(document: &Value) -> Result<Self> {
        let capacity = require(document, "capacity", "capacity")?
            .as_object()
            .ok_or_else(|| Error::decode("capacity", "'capacity' is not an object"))?;

        let mut groups = Vec::with_capacity(capacity.len());
        for (name, categories) in capacity {
            let categories = categories.as_object().ok_or_else(|| {
                Error::decode("capacity", format!("detail group '{}' is not an object", name))
            })?;

            let mut decoded = Vec::with_capacity(categories.len());
            for (key, records) in categories {
                let bucket = ForecastBucket::from_category_key(key);
                let mut records: Vec<CapacityRecord> = serde_json::from_value(records.clone())
                    .map_err(|e| {
                        Error::decode("capacity", format!("category '{}': {}", key, e))
                    })?;
                for record in &mut records {
                    record.bucket = bucket;
                }
                decoded.push(CapacityCategory {
                    key: key.clone(),
                    bucket,
                    records,
                });
            }

            groups.push(DetailGroup {
                name: name.clone(),
                categories: decoded,
            });
        }

        Ok(Self { groups })
    }

    /// All records in nested iteration order: group, then category, then list.
    pub fn records(&self) -> impl Iterator<Item = &CapacityRecord> {
        self.groups
            .iter()
            .flat_map(|group| group.categories.iter())
            .flat_map(|category| category.records.iter())
    }

    pub fn into_records(self) -> Vec<CapacityRecord> {
        self.groups
            .into_iter()
            .flat_map(|group| group.categories)
            .flat_map(|category| category.records)
            .collect()
    }
}
