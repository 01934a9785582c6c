//! Grouped resistance-rate aggregation.
//!
//! The raw susceptibility dataset carries one row per isolate with a
//! categorical S/I/R result. Before flagging, rows are rolled up into a
//! weekly resistance rate per requesting service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{Observation, TimeBucket, Value};
use crate::error::EngineError;

/// Resistance rate for one `(week, group)` cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistanceRate {
    pub week: TimeBucket,
    pub group: String,
    /// Percentage of results equal to the resistant symbol, 0–100.
    pub rate: f64,
}

/// Roll categorical results up into per-`(week, group)` resistance rates.
///
/// The rate is 100 × resistant / total over the rows of each cell, where a
/// row is resistant when its `metric` cell equals `resistant_symbol`
/// exactly. Missing and non-matching cells stay in the denominator: a blank
/// result is counted as a non-resistant one, matching how the dashboard has
/// always counted. Rows without a group label are skipped, and cells with no
/// rows are never emitted, so no rate divides by zero.
///
/// Returns [`EngineError::UnknownMetric`] when no input row carries
/// `metric`. The output is sorted by `(week, group)`.
pub fn aggregate_resistance_rate(
    rows: &[Observation],
    metric: &str,
    resistant_symbol: &str,
) -> Result<Vec<ResistanceRate>, EngineError> {
    if !rows.iter().any(|r| r.get(metric).is_some()) {
        return Err(EngineError::UnknownMetric(metric.to_string()));
    }

    // (resistant, total) per cell; BTreeMap keeps (week, group) order
    let mut cells: BTreeMap<(TimeBucket, String), (usize, usize)> = BTreeMap::new();
    for row in rows {
        let Some(group) = row.group.as_deref() else {
            continue;
        };
        let resistant =
            row.get(metric).and_then(Value::as_text).is_some_and(|s| s == resistant_symbol);

        let cell = cells.entry((row.week, group.to_string())).or_insert((0, 0));
        cell.0 += usize::from(resistant);
        cell.1 += 1;
    }

    Ok(cells
        .into_iter()
        .map(|((week, group), (resistant, total))| ResistanceRate {
            week,
            group,
            rate: resistant as f64 / total as f64 * 100.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isolate(week: u32, service: &str, result: impl Into<Value>) -> Observation {
        Observation::new(TimeBucket::Week(week)).with_group(service).value("Oxacilline", result)
    }

    #[test]
    fn test_rates_per_week_and_service() {
        let rows = vec![
            isolate(1, "A", "R"),
            isolate(1, "A", "S"),
            isolate(1, "B", "R"),
        ];
        let rates = aggregate_resistance_rate(&rows, "Oxacilline", "R").unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].group, "A");
        assert_eq!(rates[0].rate, 50.0);
        assert_eq!(rates[1].group, "B");
        assert_eq!(rates[1].rate, 100.0);
    }

    #[test]
    fn test_missing_counts_in_denominator_only() {
        let rows = vec![
            isolate(1, "A", "R"),
            isolate(1, "A", Value::Missing),
            isolate(1, "A", "S"),
            isolate(1, "A", "I"),
        ];
        let rates = aggregate_resistance_rate(&rows, "Oxacilline", "R").unwrap();
        assert_eq!(rates[0].rate, 25.0);
    }

    #[test]
    fn test_symbol_match_is_exact() {
        let rows = vec![isolate(1, "A", "r"), isolate(1, "A", "R ")];
        let rates = aggregate_resistance_rate(&rows, "Oxacilline", "R").unwrap();
        assert_eq!(rates[0].rate, 0.0);
    }

    #[test]
    fn test_rows_without_group_are_skipped() {
        let rows = vec![
            isolate(1, "A", "R"),
            Observation::new(TimeBucket::Week(1)).value("Oxacilline", "R"),
        ];
        let rates = aggregate_resistance_rate(&rows, "Oxacilline", "R").unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].rate, 100.0);
    }

    #[test]
    fn test_unknown_metric() {
        let rows = vec![isolate(1, "A", "R")];
        assert_eq!(
            aggregate_resistance_rate(&rows, "Vancomycin", "R"),
            Err(EngineError::UnknownMetric("Vancomycin".into()))
        );
    }

    #[test]
    fn test_output_sorted_by_week_then_group() {
        let rows = vec![
            isolate(2, "B", "S"),
            isolate(1, "B", "S"),
            isolate(2, "A", "S"),
            isolate(1, "A", "S"),
        ];
        let rates = aggregate_resistance_rate(&rows, "Oxacilline", "R").unwrap();
        let cells: Vec<(TimeBucket, &str)> =
            rates.iter().map(|r| (r.week, r.group.as_str())).collect();
        assert_eq!(
            cells,
            vec![
                (TimeBucket::Week(1), "A"),
                (TimeBucket::Week(1), "B"),
                (TimeBucket::Week(2), "A"),
                (TimeBucket::Week(2), "B"),
            ]
        );
    }
}
