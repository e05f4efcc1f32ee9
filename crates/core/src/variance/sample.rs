use crate::error::{IccError, Result};

/// Unbiased sample variance (divisor `len - 1`).
///
/// Two-pass: mean first, then squared deviations.
///
/// # Errors
/// Returns [`IccError::Data`] when fewer than two values are given, since the
/// divisor would be zero.
pub fn sample_variance(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(IccError::Data(format!(
            "Sample variance needs at least 2 values, got {}",
            values.len()
        )));
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok(ss / (values.len() - 1) as f64)
}
