//! F-distribution CDF and quantile function.
//!
//! The CDF comes straight from `statrs`' `FisherSnedecor`. The quantile goes
//! through the Beta relationship: if `B ~ Beta(d1/2, d2/2)` then
//! `X = d2 * B / (d1 * (1 - B))` is `F(d1, d2)`, and `statrs` inverts the
//! regularised incomplete beta function directly.

use statrs::distribution::{Beta, ContinuousCDF, FisherSnedecor};

use crate::error::{IccError, Result};

fn check_degrees_of_freedom(df1: f64, df2: f64) -> Result<()> {
    if !(df1.is_finite() && df2.is_finite() && df1 > 0.0 && df2 > 0.0) {
        return Err(IccError::Distribution(format!(
            "degrees of freedom must be positive and finite, got ({}, {})",
            df1, df2
        )));
    }
    Ok(())
}

/// `P(X <= x)` for `X ~ F(df1, df2)`.
///
/// # Errors
/// Returns [`IccError::Distribution`] for non-positive degrees of freedom or
/// a NaN argument.
pub fn f_cdf(x: f64, df1: f64, df2: f64) -> Result<f64> {
    check_degrees_of_freedom(df1, df2)?;
    if x.is_nan() {
        return Err(IccError::Distribution("F statistic is NaN".to_string()));
    }
    if x <= 0.0 {
        return Ok(0.0);
    }
    if x.is_infinite() {
        return Ok(1.0);
    }
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| IccError::Distribution(e.to_string()))?;
    Ok(dist.cdf(x).clamp(0.0, 1.0))
}

/// The `p`-quantile of `F(df1, df2)`, i.e. the `x` with `P(X <= x) = p`.
///
/// # Errors
/// Returns [`IccError::Distribution`] unless `0 < p < 1` and both degrees of
/// freedom are positive.
pub fn f_quantile(p: f64, df1: f64, df2: f64) -> Result<f64> {
    check_degrees_of_freedom(df1, df2)?;
    if !(p > 0.0 && p < 1.0) {
        return Err(IccError::Distribution(format!(
            "quantile probability must lie in (0, 1), got {}",
            p
        )));
    }

    let beta =
        Beta::new(df1 / 2.0, df2 / 2.0).map_err(|e| IccError::Distribution(e.to_string()))?;
    let b = beta.inverse_cdf(p);
    if !(b.is_finite() && b > 0.0 && b < 1.0) {
        return Err(IccError::Distribution(format!(
            "Beta({}, {}) quantile at p = {} fell outside (0, 1): {}",
            df1 / 2.0,
            df2 / 2.0,
            p,
            b
        )));
    }
    Ok(df2 * b / (df1 * (1.0 - b)))
}
