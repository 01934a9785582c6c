//! Evaluation orchestration.
//!
//! One parameterized path replaces the dashboard's per-tab copies of the
//! threshold math: pick a policy from the metric name, compute the fence,
//! flag the points, and hand back a report the UI can chart directly.
//! Every call recomputes from its arguments and mutates nothing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alarm::{
    aggregate_resistance_rate, compute_threshold, flag_observations, AlarmPolicy, PolicyConfig,
    ResistanceRate, Threshold,
};
use crate::data::{Table, TimeBucket};
use crate::error::EngineError;

/// Threshold granularity for grouped evaluation.
///
/// The dashboard historically pools every service into a single Tukey fence;
/// [`GroupingMode::PerGroup`] computes one fence per service instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingMode {
    /// One threshold over all groups pooled together.
    #[default]
    Pooled,
    /// One threshold per group.
    PerGroup,
}

/// One evaluated point, ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmPoint {
    pub week: TimeBucket,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group: Option<String>,
    /// The observed value; `None` when the source cell was missing.
    pub value: Option<f64>,
    pub flagged: bool,
}

/// The threshold(s) backing a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportThreshold {
    /// One fence over every point.
    Pooled(Threshold),
    /// One fence per group ([`GroupingMode::PerGroup`] evaluation).
    PerGroup(BTreeMap<String, Threshold>),
}

/// The outcome of evaluating one metric selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmReport {
    pub metric: String,
    pub policy: AlarmPolicy,
    pub threshold: ReportThreshold,
    /// All evaluated points, in `(week, group)` order.
    pub points: Vec<AlarmPoint>,
    /// Groups with too little data for a per-group fence; their points are
    /// never flagged. Always empty under pooled evaluation.
    pub undecided_groups: Vec<String>,
}

impl AlarmReport {
    /// Only the flagged points, in order (the dashboard's alarm table).
    pub fn alarms(&self) -> impl Iterator<Item = &AlarmPoint> {
        self.points.iter().filter(|p| p.flagged)
    }

    /// Check whether any point flagged.
    pub fn has_alarms(&self) -> bool {
        self.points.iter().any(|p| p.flagged)
    }
}

/// The resistance alarm engine.
///
/// Holds the policy configuration and the grouping granularity. Evaluation
/// is synchronous and pure, so one engine can serve every selection of a
/// dashboard session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    /// Which metric names use the zero-tolerance policy.
    pub policies: PolicyConfig,
    /// Threshold granularity for [`Engine::evaluate_rates`].
    pub grouping: GroupingMode,
}

impl Engine {
    /// Create an engine with the default policy configuration and pooled
    /// grouped thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a numeric metric column: one threshold over the whole
    /// series, one flag per row.
    ///
    /// This is the path behind the phenotype and antibiotic tabs. Errors
    /// ([`EngineError::UnknownMetric`], [`EngineError::InsufficientData`])
    /// propagate to the caller; nothing is flagged on a fence that could not
    /// be computed.
    pub fn evaluate(&self, table: &Table, metric: &str) -> Result<AlarmReport, EngineError> {
        let series = table.series(metric)?;
        let policy = self.policies.select(metric);
        let values = series.values();
        let threshold = compute_threshold(&values, policy)?;
        let flags = flag_observations(&values, &threshold);
        debug!(
            metric,
            ?policy,
            threshold = threshold.value(),
            alarms = flags.iter().filter(|f| **f).count(),
            "evaluated metric column"
        );

        let points = series
            .points
            .into_iter()
            .zip(flags)
            .map(|(p, flagged)| AlarmPoint {
                week: p.week,
                group: p.group,
                value: p.value,
                flagged,
            })
            .collect();

        Ok(AlarmReport {
            metric: series.metric,
            policy,
            threshold: ReportThreshold::Pooled(threshold),
            points,
            undecided_groups: Vec::new(),
        })
    }

    /// Evaluate a categorical susceptibility column per `(week, group)`:
    /// aggregate resistance rates, then threshold and flag them.
    ///
    /// This is the path behind the per-service alert tab. Under the default
    /// [`GroupingMode::Pooled`] all services share one fence; under
    /// [`GroupingMode::PerGroup`] each service gets its own, and services
    /// with fewer than two rate points end up in
    /// [`AlarmReport::undecided_groups`] instead of failing the whole
    /// report.
    pub fn evaluate_rates(
        &self,
        table: &Table,
        metric: &str,
        resistant_symbol: &str,
    ) -> Result<AlarmReport, EngineError> {
        let rates = aggregate_resistance_rate(table.rows(), metric, resistant_symbol)?;
        let policy = self.policies.select(metric);
        debug!(
            metric,
            ?policy,
            cells = rates.len(),
            grouping = ?self.grouping,
            "aggregated resistance rates"
        );

        match self.grouping {
            GroupingMode::Pooled => pooled_report(metric, policy, rates),
            GroupingMode::PerGroup => Ok(per_group_report(metric, policy, rates)),
        }
    }
}

fn pooled_report(
    metric: &str,
    policy: AlarmPolicy,
    rates: Vec<ResistanceRate>,
) -> Result<AlarmReport, EngineError> {
    let values: Vec<Option<f64>> = rates.iter().map(|r| Some(r.rate)).collect();
    let threshold = compute_threshold(&values, policy)?;
    let flags = flag_observations(&values, &threshold);

    let points = rates
        .into_iter()
        .zip(flags)
        .map(|(r, flagged)| AlarmPoint {
            week: r.week,
            group: Some(r.group),
            value: Some(r.rate),
            flagged,
        })
        .collect();

    Ok(AlarmReport {
        metric: metric.to_string(),
        policy,
        threshold: ReportThreshold::Pooled(threshold),
        points,
        undecided_groups: Vec::new(),
    })
}

fn per_group_report(
    metric: &str,
    policy: AlarmPolicy,
    rates: Vec<ResistanceRate>,
) -> AlarmReport {
    let mut by_group: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for rate in &rates {
        by_group.entry(rate.group.clone()).or_default().push(Some(rate.rate));
    }

    let mut thresholds = BTreeMap::new();
    let mut undecided = Vec::new();
    for (group, values) in &by_group {
        match compute_threshold(values, policy) {
            Ok(threshold) => {
                thresholds.insert(group.clone(), threshold);
            }
            Err(_) => undecided.push(group.clone()),
        }
    }

    let points = rates
        .into_iter()
        .map(|r| {
            let flagged = thresholds
                .get(&r.group)
                .is_some_and(|t| flag_observations(&[Some(r.rate)], t)[0]);
            AlarmPoint {
                week: r.week,
                group: Some(r.group),
                value: Some(r.rate),
                flagged,
            }
        })
        .collect();

    AlarmReport {
        metric: metric.to_string(),
        policy,
        threshold: ReportThreshold::PerGroup(thresholds),
        points,
        undecided_groups: undecided,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Observation, Value};

    fn weekly_table(metric: &str, values: &[f64]) -> Table {
        Table::from_rows(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Observation::new(TimeBucket::Week(i as u32 + 1)).value(metric, *v))
                .collect(),
        )
    }

    fn isolate(week: u32, service: &str, result: impl Into<Value>) -> Observation {
        Observation::new(TimeBucket::Week(week)).with_group(service).value("Oxacilline", result)
    }

    #[test]
    fn test_evaluate_flags_the_outlier_week() {
        let table =
            weekly_table("Oxacilline", &[1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 5.0, 50.0]);
        let report = Engine::new().evaluate(&table, "Oxacilline").unwrap();

        assert_eq!(report.policy, AlarmPolicy::Tukey);
        assert_eq!(report.points.len(), 10);
        let alarms: Vec<&AlarmPoint> = report.alarms().collect();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].week, TimeBucket::Week(10));
        assert_eq!(alarms[0].value, Some(50.0));
    }

    #[test]
    fn test_evaluate_vancomycin_zero_tolerance() {
        let table = weekly_table("Vancomycin", &[0.0, 0.0, 1.0, 0.0]);
        let report = Engine::new().evaluate(&table, "Vancomycin").unwrap();

        assert_eq!(report.policy, AlarmPolicy::ZeroTolerance);
        let flags: Vec<bool> = report.points.iter().map(|p| p.flagged).collect();
        assert_eq!(flags, vec![false, false, true, false]);
        match report.threshold {
            ReportThreshold::Pooled(t) => assert_eq!(t.value(), 0.0),
            ReportThreshold::PerGroup(_) => panic!("numeric evaluation is always pooled"),
        }
    }

    #[test]
    fn test_evaluate_unknown_metric() {
        let table = weekly_table("Oxacilline", &[1.0, 2.0]);
        assert_eq!(
            Engine::new().evaluate(&table, "Linezolid"),
            Err(EngineError::UnknownMetric("Linezolid".into()))
        );
    }

    #[test]
    fn test_evaluate_insufficient_data() {
        let table = weekly_table("Oxacilline", &[4.5]);
        assert_eq!(
            Engine::new().evaluate(&table, "Oxacilline"),
            Err(EngineError::InsufficientData { found: 1 })
        );
    }

    #[test]
    fn test_evaluate_does_not_mutate_the_table() {
        let table = weekly_table("Oxacilline", &[1.0, 2.0, 3.0]);
        let before = table.clone();
        let _ = Engine::new().evaluate(&table, "Oxacilline").unwrap();
        assert_eq!(table, before);
    }

    /// Per-service rates share one pooled fence by default, the dashboard's
    /// historical behavior.
    #[test]
    fn test_evaluate_rates_pooled_default() {
        let mut rows = Vec::new();
        // Both services fully susceptible for weeks 1..=5
        for week in 1..=5 {
            rows.push(isolate(week, "A", "S"));
            rows.push(isolate(week, "B", "S"));
        }
        // Week 6: A stays clean, B turns resistant
        rows.push(isolate(6, "A", "S"));
        rows.push(isolate(6, "B", "R"));

        let report =
            Engine::new().evaluate_rates(&Table::from_rows(rows), "Oxacilline", "R").unwrap();

        assert!(matches!(report.threshold, ReportThreshold::Pooled(_)));
        assert!(report.undecided_groups.is_empty());
        let alarms: Vec<&AlarmPoint> = report.alarms().collect();
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].group.as_deref(), Some("B"));
        assert_eq!(alarms[0].week, TimeBucket::Week(6));
        assert_eq!(alarms[0].value, Some(100.0));
    }

    #[test]
    fn test_evaluate_rates_per_group_undecided() {
        let engine = Engine {
            grouping: GroupingMode::PerGroup,
            ..Engine::default()
        };
        let mut rows = Vec::new();
        for week in 1..=4 {
            rows.push(isolate(week, "A", if week == 4 { "R" } else { "S" }));
        }
        // Service B only ever appears once: no fence possible for it
        rows.push(isolate(2, "B", "R"));

        let report = engine.evaluate_rates(&Table::from_rows(rows), "Oxacilline", "R").unwrap();

        assert_eq!(report.undecided_groups, vec!["B".to_string()]);
        match &report.threshold {
            ReportThreshold::PerGroup(fences) => {
                assert!(fences.contains_key("A"));
                assert!(!fences.contains_key("B"));
            }
            ReportThreshold::Pooled(_) => panic!("expected per-group thresholds"),
        }
        // B's lone 100% rate stays unflagged: no decision, not "no alarm"
        let b_points: Vec<&AlarmPoint> =
            report.points.iter().filter(|p| p.group.as_deref() == Some("B")).collect();
        assert_eq!(b_points.len(), 1);
        assert!(!b_points[0].flagged);
    }

    #[test]
    fn test_report_serializes() {
        let table = weekly_table("Oxacilline", &[1.0, 2.0, 3.0]);
        let report = Engine::new().evaluate(&table, "Oxacilline").unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let back: AlarmReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
