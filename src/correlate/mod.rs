//! Key-based join of a primary record list against secondary records
//!
//! The secondary side is indexed once by key. When several secondary records
//! share a key, the first one in iteration order wins and later ones are
//! ignored; for capacity documents that order is group, then category, then
//! list position.

use crate::document::{CapacityDocument, CapacityRecord, InventoryRecord};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

pub const NOT_AVAILABLE: &str = "N/A";

/// Secondary records indexed by key, first insertion wins.
#[derive(Debug)]
pub struct SecondaryIndex<'a, K, S> {
    entries: HashMap<K, &'a S>,
    duplicates: usize,
}

impl<'a, K, S> SecondaryIndex<'a, K, S>
where
    K: Eq + Hash,
{
    pub fn build<I, F>(records: I, key: F) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        F: Fn(&S) -> K,
    {
        let mut entries = HashMap::new();
        let mut duplicates = 0;
        for record in records {
            match entries.entry(key(record)) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(_) => duplicates += 1,
            }
        }
        Self {
            entries,
            duplicates,
        }
    }

    pub fn get(&self, key: &K) -> Option<&'a S> {
        self.entries.get(key).copied()
    }

    /// Secondary records dropped because an earlier record had the same key.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Join every primary record with its secondary match, if any.
///
/// Output order follows `primary`; exactly one output per primary record.
pub fn correlate<'a, P, S, K, I, FP, FS, E, R>(
    primary: &[P],
    secondary: I,
    primary_key: FP,
    secondary_key: FS,
    enrich: E,
) -> Vec<R>
where
    K: Eq + Hash,
    S: 'a,
    I: IntoIterator<Item = &'a S>,
    FP: Fn(&P) -> K,
    FS: Fn(&S) -> K,
    E: Fn(&P, Option<&S>) -> R,
{
    let index = SecondaryIndex::build(secondary, secondary_key);
    if index.duplicates() > 0 {
        debug!(
            "{} secondary records shadowed by an earlier record with the same key",
            index.duplicates()
        );
    }

    primary
        .iter()
        .map(|record| enrich(record, index.get(&primary_key(record))))
        .collect()
}

/// A capacity figure, or the sentinel when no capacity record matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CapacityValue {
    Available(f64),
    NotAvailable,
}

impl CapacityValue {
    pub fn is_available(&self) -> bool {
        matches!(self, CapacityValue::Available(_))
    }
}

impl From<Option<f64>> for CapacityValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CapacityValue::NotAvailable, CapacityValue::Available)
    }
}

impl fmt::Display for CapacityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityValue::Available(value) => write!(f, "{}", value),
            CapacityValue::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedInventoryRecord {
    pub inventory: InventoryRecord,
    pub used_capacity_gb: CapacityValue,
    pub percent_capacity: CapacityValue,
    pub allocated_capacity_gb: CapacityValue,
}

impl CorrelatedInventoryRecord {
    fn new(inventory: &InventoryRecord, capacity: Option<&CapacityRecord>) -> Self {
        match capacity {
            Some(capacity) => Self {
                inventory: inventory.clone(),
                used_capacity_gb: capacity.used_capacity_gb.into(),
                percent_capacity: CapacityValue::Available(capacity.percent_capacity),
                allocated_capacity_gb: capacity.allocated_capacity_gb.into(),
            },
            None => Self {
                inventory: inventory.clone(),
                used_capacity_gb: CapacityValue::NotAvailable,
                percent_capacity: CapacityValue::NotAvailable,
                allocated_capacity_gb: CapacityValue::NotAvailable,
            },
        }
    }
}

/// Attach capacity figures to each inventory system by serial number.
pub fn correlate_inventory(
    inventory: &[InventoryRecord],
    capacity: &CapacityDocument,
) -> Vec<CorrelatedInventoryRecord> {
    correlate(
        inventory,
        capacity.records(),
        |system| system.serial_number.clone(),
        |record| record.serial_number.clone(),
        CorrelatedInventoryRecord::new,
    )
}
