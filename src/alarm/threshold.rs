//! Alarm threshold computation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::policy::AlarmPolicy;
use crate::error::EngineError;

/// Tukey fence multiplier on the interquartile range.
const TUKEY_FACTOR: f64 = 1.5;

/// A computed alarm threshold.
///
/// Only [`compute_threshold`] constructs these, so a threshold in hand is
/// always backed by enough data: there is no undefined value to compare
/// against by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    value: f64,
    policy: AlarmPolicy,
}

impl Threshold {
    /// The fence value observations are compared against.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The policy that produced this threshold.
    pub fn policy(&self) -> AlarmPolicy {
        self.policy
    }
}

impl fmt::Display for Threshold {
    /// Caption text for the dashboard's alarm-criterion line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.policy {
            AlarmPolicy::Tukey => write!(f, "Tukey threshold: {:.2}", self.value),
            AlarmPolicy::ZeroTolerance => write!(f, "alarm from the first case"),
        }
    }
}

/// Compute the alarm threshold for a series of observations.
///
/// Missing entries are dropped before computation. Under
/// [`AlarmPolicy::Tukey`] at least two numeric values are required; fewer
/// yield [`EngineError::InsufficientData`] rather than a misleading fence.
/// [`AlarmPolicy::ZeroTolerance`] needs no data: the threshold is fixed at 0.
pub fn compute_threshold(
    values: &[Option<f64>],
    policy: AlarmPolicy,
) -> Result<Threshold, EngineError> {
    match policy {
        AlarmPolicy::ZeroTolerance => Ok(Threshold { value: 0.0, policy }),
        AlarmPolicy::Tukey => {
            let mut numeric: Vec<f64> = values.iter().copied().flatten().collect();
            if numeric.len() < 2 {
                return Err(EngineError::InsufficientData {
                    found: numeric.len(),
                });
            }
            numeric.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile_sorted(&numeric, 0.25);
            let q3 = quantile_sorted(&numeric, 0.75);
            let iqr = q3 - q1;

            Ok(Threshold {
                value: q3 + TUKEY_FACTOR * iqr,
                policy,
            })
        }
    }
}

/// Linear-interpolation quantile over already-sorted values.
///
/// Rank = q × (n − 1), interpolated between the two straddling order
/// statistics. This is the quantile method the dashboard has always used.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());

    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}
