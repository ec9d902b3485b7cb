//! Filtering, ordering and summary statistics over report rows

use crate::error::{Error, Result};
use serde::Serialize;

/// A derived scalar and the number of records that contributed to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    pub value: f64,
    pub count: usize,
}

/// Order by `key` ascending. The sort is stable, so equal keys keep their
/// input order; NaN sorts after every number.
pub fn sorted_ascending<T, F>(mut records: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    records.sort_by(|a, b| key(a).total_cmp(&key(b)));
    records
}

/// Keep records whose `field` is at least `threshold`, preserving order.
pub fn threshold_filter<T, F>(records: Vec<T>, threshold: f64, field: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    records
        .into_iter()
        .filter(|record| field(record) >= threshold)
        .collect()
}

/// Arithmetic mean. An empty input is [`Error::EmptyAggregateInput`].
pub fn mean<I>(values: I) -> Result<AggregateResult>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        return Err(Error::EmptyAggregateInput);
    }

    Ok(AggregateResult {
        value: sum / count as f64,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mean_of_two() {
        let result = mean([1.0, 0.5]).unwrap();
        assert_eq!(result.value, 0.75);
        assert_eq!(result.count, 2);
    }

    #[test]
    fn test_mean_of_three() {
        let result = mean(vec![0.8, 0.6, 0.4]).unwrap();
        assert!((result.value - 0.6).abs() < 1e-12);
        assert_eq!(result.count, 3);
    }

    #[test]
    fn test_mean_of_nothing() {
        let result = mean(Vec::<f64>::new());
        assert!(matches!(result, Err(Error::EmptyAggregateInput)));
    }

    #[test]
    fn test_threshold_filter_inclusive() {
        let rows = vec![("a", 50.0), ("b", 49.99), ("c", 51.0), ("d", 50.0)];
        let kept = threshold_filter(rows, 50.0, |row| row.1);
        assert_eq!(kept, vec![("a", 50.0), ("c", 51.0), ("d", 50.0)]);
    }

    #[test]
    fn test_sort_nan_last() {
        let rows = vec![f64::NAN, 3.0, 1.0];
        let sorted = sorted_ascending(rows, |v| *v);
        assert_eq!(sorted[0], 1.0);
        assert_eq!(sorted[1], 3.0);
        assert!(sorted[2].is_nan());
    }

    proptest! {
        #[test]
        fn prop_sorted_is_ordered_and_stable(
            keys in prop::collection::vec(0u8..20, 0..50),
        ) {
            let rows: Vec<(usize, f64)> = keys
                .iter()
                .enumerate()
                .map(|(index, key)| (index, *key as f64))
                .collect();
            let sorted = sorted_ascending(rows.clone(), |row| row.1);

            prop_assert_eq!(sorted.len(), rows.len());
            for pair in sorted.windows(2) {
                prop_assert!(pair[0].1 <= pair[1].1);
                if pair[0].1 == pair[1].1 {
                    prop_assert!(pair[0].0 < pair[1].0);
                }
            }
        }

        #[test]
        fn prop_threshold_keeps_exactly_matching(
            values in prop::collection::vec(0.0f64..100.0, 0..50),
            threshold in 0.0f64..100.0,
        ) {
            let kept = threshold_filter(values.clone(), threshold, |v| *v);
            let expected: Vec<f64> = values.into_iter().filter(|v| *v >= threshold).collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn prop_mean_within_bounds(values in prop::collection::vec(0.0f64..10.0, 1..30)) {
            let result = mean(values.iter().copied()).unwrap();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(result.count, values.len());
            prop_assert!(result.value >= min - 1e-9 && result.value <= max + 1e-9);
        }
    }
}
