//! Time-to-full classification of capacity records

use crate::aggregate;
use crate::document::CapacityRecord;
use serde::Serialize;
use std::fmt;

/// Forecast bucket derived from a capacity category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum ForecastBucket {
    CurrentlyFull,
    OneMonth,
    ThreeMonths,
    SixMonths,
    /// Catch-all for every unrecognised category key.
    #[default]
    MoreThanSixMonths,
}

impl ForecastBucket {
    pub const ALL: [ForecastBucket; 5] = [
        ForecastBucket::CurrentlyFull,
        ForecastBucket::OneMonth,
        ForecastBucket::ThreeMonths,
        ForecastBucket::SixMonths,
        ForecastBucket::MoreThanSixMonths,
    ];

    /// Total over all strings; exact key matches first, catch-all last.
    pub fn from_category_key(key: &str) -> Self {
        match key {
            "current_90" => ForecastBucket::CurrentlyFull,
            "1_month_90" => ForecastBucket::OneMonth,
            "3_months_90" => ForecastBucket::ThreeMonths,
            "6_months_90" => ForecastBucket::SixMonths,
            _ => ForecastBucket::MoreThanSixMonths,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ForecastBucket::CurrentlyFull => "Currently Full",
            ForecastBucket::OneMonth => "1 Month to Full",
            ForecastBucket::ThreeMonths => "3 Months to Full",
            ForecastBucket::SixMonths => "6 Months to Full",
            ForecastBucket::MoreThanSixMonths => "More than 6 Months",
        }
    }
}

impl fmt::Display for ForecastBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a category key straight to its label.
pub fn classify(category_key: &str) -> &'static str {
    ForecastBucket::from_category_key(category_key).label()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastEntry {
    pub hostname: String,
    pub percent_capacity: f64,
    pub bucket: ForecastBucket,
}

impl ForecastEntry {
    pub fn label(&self) -> &'static str {
        self.bucket.label()
    }
}

impl From<&CapacityRecord> for ForecastEntry {
    fn from(record: &CapacityRecord) -> Self {
        Self {
            hostname: record.hostname.clone(),
            percent_capacity: record.percent_capacity,
            bucket: record.bucket,
        }
    }
}

/// Label every record and keep those at or above `threshold`, in input order.
pub fn filter_and_label<'a, I>(records: I, threshold: f64) -> Vec<ForecastEntry>
where
    I: IntoIterator<Item = &'a CapacityRecord>,
{
    let labelled: Vec<ForecastEntry> = records.into_iter().map(ForecastEntry::from).collect();
    aggregate::threshold_filter(labelled, threshold, |entry| entry.percent_capacity)
}

/// Label every record and order ascending by percent capacity; ties keep
/// their input order.
pub fn forecast<'a, I>(records: I) -> Vec<ForecastEntry>
where
    I: IntoIterator<Item = &'a CapacityRecord>,
{
    let labelled: Vec<ForecastEntry> = records.into_iter().map(ForecastEntry::from).collect();
    aggregate::sorted_ascending(labelled, |entry| entry.percent_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hostname: &str, percent: f64, bucket: ForecastBucket) -> CapacityRecord {
        CapacityRecord {
            serial_number: format!("SN-{hostname}"),
            hostname: hostname.to_string(),
            used_capacity_gb: None,
            percent_capacity: percent,
            allocated_capacity_gb: None,
            bucket,
        }
    }

    #[test]
    fn test_known_keys() {
        assert_eq!(classify("current_90"), "Currently Full");
        assert_eq!(classify("1_month_90"), "1 Month to Full");
        assert_eq!(classify("3_months_90"), "3 Months to Full");
        assert_eq!(classify("6_months_90"), "6 Months to Full");
    }

    #[test]
    fn test_unknown_keys_fall_through_to_catch_all() {
        for key in ["", "12_months_90", "CURRENT_90", "current_90 ", "current"] {
            assert_eq!(classify(key), "More than 6 Months", "key {:?}", key);
        }
    }

    #[test]
    fn test_filter_is_inclusive() {
        let records = vec![
            record("a", 69.9, ForecastBucket::SixMonths),
            record("b", 70.0, ForecastBucket::ThreeMonths),
            record("c", 95.0, ForecastBucket::CurrentlyFull),
        ];
        let entries = filter_and_label(&records, 70.0);
        let hosts: Vec<_> = entries.iter().map(|e| e.hostname.as_str()).collect();
        assert_eq!(hosts, vec!["b", "c"]);
        assert_eq!(entries[1].label(), "Currently Full");
    }

    #[test]
    fn test_forecast_sorts_all_records_stably() {
        let records = vec![
            record("a", 80.0, ForecastBucket::OneMonth),
            record("b", 10.0, ForecastBucket::MoreThanSixMonths),
            record("c", 80.0, ForecastBucket::CurrentlyFull),
            record("d", 45.0, ForecastBucket::SixMonths),
        ];
        let entries = forecast(&records);
        let hosts: Vec<_> = entries.iter().map(|e| e.hostname.as_str()).collect();
        assert_eq!(hosts, vec!["b", "d", "a", "c"]);
    }
}
