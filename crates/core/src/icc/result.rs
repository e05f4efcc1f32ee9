use serde::Serialize;

use crate::error::{IccError, Result};

use super::config::IccConfig;

/// Point estimate, significance test and confidence interval for one ICC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IccResult {
    /// ICC point estimate. Usually in [0, 1]; negative values mean the
    /// measurements are unreliable.
    pub r: f64,
    /// F statistic for `H0: ICC <= r0`.
    #[serde(rename = "F")]
    pub f: f64,
    /// Numerator degrees of freedom, `n - 1`.
    pub df1: usize,
    /// Denominator degrees of freedom, `(n - 1) * (k - 1)`.
    pub df2: usize,
    /// One-sided upper-tail p-value.
    pub p: f64,
    /// Lower bound of the two-sided `1 - alpha` confidence interval.
    #[serde(rename = "LB")]
    pub lb: f64,
    /// Upper bound of the two-sided `1 - alpha` confidence interval.
    #[serde(rename = "UB")]
    pub ub: f64,
}

impl IccResult {
    /// Fail instead of handing out NaN or infinite fields.
    pub(crate) fn checked(self) -> Result<Self> {
        let fields = [
            ("r", self.r),
            ("F", self.f),
            ("p", self.p),
            ("LB", self.lb),
            ("UB", self.ub),
        ];
        for (quantity, value) in fields {
            if !value.is_finite() {
                return Err(IccError::Degenerate { quantity, value });
            }
        }
        Ok(self)
    }

    /// Widen the interval to include the point estimate.
    ///
    /// With a large `alpha` the `1 - alpha/2` F quantile can fall below 1,
    /// which pushes a bound past `r`. The bound is then pinned at `r`.
    pub(crate) fn bracketed(mut self) -> Self {
        if self.lb > self.r {
            log::debug!("Lower bound {} above r = {}; pinned to r", self.lb, self.r);
            self.lb = self.r;
        }
        if self.ub < self.r {
            log::debug!("Upper bound {} below r = {}; pinned to r", self.ub, self.r);
            self.ub = self.r;
        }
        self
    }

    /// Whether `value` lies inside the confidence interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lb <= value && value <= self.ub
    }

    /// Whether `H0: ICC <= r0` is rejected at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p < alpha
    }

    /// Format the result as a short report.
    pub fn summary(&self, config: &IccConfig) -> String {
        let mut s = String::new();

        s.push_str(&format!(
            "=== Intraclass Correlation ICC({}) ===\n",
            config.icc_type
        ));
        s.push_str(&format!("{}\n\n", config.icc_type.description()));
        s.push_str(&format!("ICC: {:.6}\n", self.r));
        s.push_str(&format!(
            "{:.1}% CI: [{:.6}, {:.6}]\n\n",
            100.0 * config.confidence_level(),
            self.lb,
            self.ub
        ));
        s.push_str(&format!("--- Test of H0: ICC <= {} ---\n", config.r0));
        s.push_str(&format!(
            "F({}, {}) = {:.4}   p = {:.4e}",
            self.df1, self.df2, self.f, self.p
        ));
        if self.is_significant(config.alpha) {
            s.push_str(&format!("   (reject at alpha = {})", config.alpha));
        }
        s.push('\n');
        s
    }
}
