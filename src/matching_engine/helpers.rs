//! Small numeric helpers shared by the rating and selection code.

/// Round to the nearest integer, with exact halves going up (towards +inf).
///
/// `f64::round` sends -0.5 to -1; ratings stored by the app were rounded the
/// other way, so this keeps the two in agreement.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
