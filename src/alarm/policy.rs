//! Alarm policy selection.
//!
//! Any vancomycin resistance is clinically significant regardless of the
//! statistical baseline, so vancomycin-class metrics use a zero-tolerance
//! threshold instead of a distributional one.

use serde::{Deserialize, Serialize};

/// How the alarm threshold for a metric is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmPolicy {
    /// Tukey fence: Q3 + 1.5 × IQR over the observed values.
    Tukey,
    /// Any strictly positive value alarms.
    ZeroTolerance,
}

/// Which metric names fall under the zero-tolerance policy.
///
/// Matching is case-insensitive. The defaults cover the vancomycin class
/// tracked by the dashboard; deployments can extend the lists without
/// forking the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Metric names matched exactly.
    pub zero_tolerance_names: Vec<String>,
    /// Metric name prefixes.
    pub zero_tolerance_prefixes: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            zero_tolerance_names: vec!["VRSA".to_string(), "VANCOMYCIN".to_string()],
            zero_tolerance_prefixes: vec!["VAN".to_string()],
        }
    }
}

impl PolicyConfig {
    /// Select the alarm policy for a metric name.
    ///
    /// Total: every name maps to exactly one policy.
    pub fn select(&self, metric_name: &str) -> AlarmPolicy {
        let name = metric_name.trim().to_uppercase();
        let zero_tolerance = self.zero_tolerance_names.iter().any(|n| n.to_uppercase() == name)
            || self.zero_tolerance_prefixes.iter().any(|p| name.starts_with(&p.to_uppercase()));

        if zero_tolerance {
            AlarmPolicy::ZeroTolerance
        } else {
            AlarmPolicy::Tukey
        }
    }
}

/// Select the alarm policy for a metric name using the default configuration.
pub fn select_policy(metric_name: &str) -> AlarmPolicy {
    PolicyConfig::default().select(metric_name)
}
