//! Observation flagging.

use super::threshold::Threshold;

/// Flag each observation strictly above the threshold.
///
/// The output has the same length and order as the input. Missing entries
/// never flag, and values exactly at the threshold do not alarm (strict
/// `>`). Pure function of its arguments: calling it twice with the same
/// threshold yields identical results.
pub fn flag_observations(values: &[Option<f64>], threshold: &Threshold) -> Vec<bool> {
    let fence = threshold.value();
    values.iter().map(|v| v.is_some_and(|x| x > fence)).collect()
}
