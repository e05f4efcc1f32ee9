use serde::Serialize;

use crate::error::{IccError, Result};

use super::types::IccType;

/// Settings for one ICC computation.
///
/// Defaults: `C-k`, `alpha = 0.05`, `r0 = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IccConfig {
    /// Variant to estimate.
    pub icc_type: IccType,
    /// Significance level; the interval has coverage `1 - alpha`.
    pub alpha: f64,
    /// ICC value under the null hypothesis `r <= r0`.
    pub r0: f64,
}

impl Default for IccConfig {
    fn default() -> Self {
        IccConfig {
            icc_type: IccType::ConsistencyAverage,
            alpha: 0.05,
            r0: 0.0,
        }
    }
}

impl IccConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icc_type(mut self, icc_type: IccType) -> Self {
        self.icc_type = icc_type;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn r0(mut self, r0: f64) -> Self {
        self.r0 = r0;
        self
    }

    /// Coverage of the confidence interval, `1 - alpha`.
    pub fn confidence_level(&self) -> f64 {
        1.0 - self.alpha
    }

    /// Check `alpha` and `r0` before any arithmetic is done with them.
    ///
    /// # Errors
    /// [`IccError::InvalidAlpha`] unless `0 < alpha < 1`;
    /// [`IccError::InvalidNullValue`] for a non-finite `r0`.
    pub fn validate(&self) -> Result<()> {
        validate_alpha(self.alpha)?;
        validate_r0(self.r0)
    }
}

pub(crate) fn validate_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(IccError::InvalidAlpha(alpha));
    }
    Ok(())
}

pub(crate) fn validate_r0(r0: f64) -> Result<()> {
    if !r0.is_finite() {
        return Err(IccError::InvalidNullValue {
            r0,
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}
