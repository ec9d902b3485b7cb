use super::{lenient_f64, lenient_string, require};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskBusy {
    #[serde(deserialize_with = "lenient_string")]
    pub node_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub max_diskbusy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuBusy {
    #[serde(deserialize_with = "lenient_string")]
    pub node_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub max_cpubusy_percent: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_cpubusy_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbalancedNode {
    #[serde(deserialize_with = "lenient_string")]
    pub node_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub average_cpu_busy: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub partner_average_cpu_busy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoDataNode {
    #[serde(deserialize_with = "lenient_string")]
    pub node_name: String,
    #[serde(deserialize_with = "lenient_string", default)]
    pub serial_number: String,
}

/// One recognised section of a performance summary.
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceSection {
    DiskBusy(Vec<DiskBusy>),
    CpuBusy(Vec<CpuBusy>),
    Unbalanced(Vec<UnbalancedNode>),
    NoData(Vec<NoDataNode>),
}

impl PerformanceSection {
    /// Decode `{ "sections": { name: [...] } }` in document order, skipping
    /// sections this tool does not report on.
    pub fn decode_summary(document: &Value) -> Result<Vec<Self>> {
        let sections = require(document, "sections", "performance")?
            .as_object()
            .ok_or_else(|| Error::decode("performance", "'sections' is not an object"))?;

        let mut decoded = Vec::new();
        for (name, entries) in sections {
            let section = match name.as_str() {
                "diskBusy" => PerformanceSection::DiskBusy(decode_entries(name, entries)?),
                "cpuBusy" => PerformanceSection::CpuBusy(decode_entries(name, entries)?),
                "unbalancedNode" => PerformanceSection::Unbalanced(decode_entries(name, entries)?),
                "noData" => PerformanceSection::NoData(decode_entries(name, entries)?),
                other => {
                    debug!("Skipping performance section '{}'", other);
                    continue;
                }
            };
            decoded.push(section);
        }
        Ok(decoded)
    }
}

fn decode_entries<T: serde::de::DeserializeOwned>(section: &str, entries: &Value) -> Result<Vec<T>> {
    serde_json::from_value(entries.clone())
        .map_err(|e| Error::decode("performance", format!("section '{}': {}", section, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_sections_in_order() {
        let doc = json!({"sections": {
            "cpuBusy": [{"node_name": "n1", "max_cpubusy_percent": 95, "avg_cpubusy_percent": 60}],
            "latency": [{"node_name": "n1"}],
            "noData": [{"node_name": "n9", "serial_number": "999"}],
            "diskBusy": [{"node_name": "n2", "max_diskbusy_percent": "55.5"}]
        }});
        let sections = PerformanceSection::decode_summary(&doc).unwrap();
        assert_eq!(sections.len(), 3);
        assert!(matches!(sections[0], PerformanceSection::CpuBusy(_)));
        assert!(matches!(sections[1], PerformanceSection::NoData(_)));
        match &sections[2] {
            PerformanceSection::DiskBusy(disks) => assert_eq!(disks[0].max_diskbusy_percent, 55.5),
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_decode_bad_section_entry() {
        let doc = json!({"sections": {"diskBusy": [{"node_name": "n2"}]}});
        assert!(PerformanceSection::decode_summary(&doc).is_err());
    }
}
