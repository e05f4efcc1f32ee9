use log::debug;
use serde::Serialize;

use crate::data::RatingMatrix;
use crate::error::{IccError, Result};

use super::sample::sample_variance;

/// Mean squares at or below this fraction of the total variance count as zero.
pub const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Two-way ANOVA decomposition of a subjects-by-raters table.
///
/// All variances use the `count - 1` divisor, so the mean squares match the
/// classical two-way layout without replication:
///
/// ```text
/// SS_total = Var(all cells) * (n*k - 1)
/// MSR      = Var(subject means) * k            df = n - 1
/// MSC      = Var(rater means)   * n            df = k - 1
/// MSW      = sum_i Var(subject i) / n          df = n * (k - 1)
/// MSE      = (SS_total - MSR*(n-1) - MSC*(k-1)) / ((n-1)*(k-1))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanSquares {
    /// Between-subjects (rows) mean square.
    pub msr: f64,
    /// Within-subjects mean square.
    pub msw: f64,
    /// Between-raters (columns) mean square.
    pub msc: f64,
    /// Residual (error) mean square.
    pub mse: f64,
    /// Total sum of squared deviations from the grand mean.
    pub ss_total: f64,
    /// Number of subjects.
    pub n: usize,
    /// Number of raters.
    pub k: usize,
}

impl MeanSquares {
    pub fn df_rows(&self) -> usize {
        self.n - 1
    }

    pub fn df_cols(&self) -> usize {
        self.k - 1
    }

    pub fn df_error(&self) -> usize {
        (self.n - 1) * (self.k - 1)
    }

    pub fn df_within(&self) -> usize {
        self.n * (self.k - 1)
    }

    pub fn df_total(&self) -> usize {
        self.n * self.k - 1
    }

    pub fn ss_rows(&self) -> f64 {
        self.msr * self.df_rows() as f64
    }

    pub fn ss_cols(&self) -> f64 {
        self.msc * self.df_cols() as f64
    }

    pub fn ss_error(&self) -> f64 {
        self.mse * self.df_error() as f64
    }

    pub fn ss_within(&self) -> f64 {
        self.msw * self.df_within() as f64
    }

    /// MSR / MSE, the observed F ratio for subjects.
    pub fn variance_ratio(&self) -> f64 {
        self.msr / self.mse
    }

    /// Reject a decomposition whose MSR or MSE would be used as a zero divisor.
    fn check_degenerate(&self) -> Result<()> {
        let total_variance = self.ss_total / self.df_total() as f64;
        if total_variance.is_nan() || total_variance <= 0.0 {
            return Err(IccError::Degenerate {
                quantity: "total variance",
                value: total_variance,
            });
        }
        let floor = DEGENERATE_TOLERANCE * total_variance;
        if self.msr <= floor {
            return Err(IccError::Degenerate {
                quantity: "MSR",
                value: self.msr,
            });
        }
        if self.mse <= floor {
            return Err(IccError::Degenerate {
                quantity: "MSE",
                value: self.mse,
            });
        }
        Ok(())
    }

    /// Format the decomposition as an ANOVA table.
    pub fn anova_table(&self) -> String {
        let mut s = String::new();
        s.push_str("--- Two-way ANOVA ---\n");
        s.push_str(&format!(
            "{:<16} {:>12} {:>8} {:>12}\n",
            "Source", "SS", "DF", "MS"
        ));
        s.push_str(&format!("{}\n", "-".repeat(51)));

        let rows = [
            ("Subjects", self.ss_rows(), self.df_rows(), Some(self.msr)),
            ("Raters", self.ss_cols(), self.df_cols(), Some(self.msc)),
            ("Residual", self.ss_error(), self.df_error(), Some(self.mse)),
            ("Within subjects", self.ss_within(), self.df_within(), Some(self.msw)),
            ("Total", self.ss_total, self.df_total(), None),
        ];
        for (source, ss, df, ms) in rows {
            match ms {
                Some(ms) => s.push_str(&format!(
                    "{:<16} {:>12.4} {:>8} {:>12.4}\n",
                    source, ss, df, ms
                )),
                None => s.push_str(&format!("{:<16} {:>12.4} {:>8}\n", source, ss, df)),
            }
        }
        s
    }
}

/// Decompose a rating matrix into its mean squares.
///
/// # Errors
/// - [`IccError::TooFewSubjects`] / [`IccError::TooFewRaters`] below 2 x 2.
/// - [`IccError::Degenerate`] when the total variance, MSR or MSE is zero or
///   negative (up to [`DEGENERATE_TOLERANCE`] relative to the total variance).
///   Data where every subject gets the same score from all raters lands here.
pub fn decompose(ratings: &RatingMatrix) -> Result<MeanSquares> {
    let n = ratings.n_subjects();
    let k = ratings.n_raters();
    if n < 2 {
        return Err(IccError::TooFewSubjects(n));
    }
    if k < 2 {
        return Err(IccError::TooFewRaters(k));
    }

    let ss_total = sample_variance(ratings.values().as_slice())? * (n * k - 1) as f64;
    let msr = sample_variance(ratings.subject_means().as_slice())? * k as f64;
    let msw = (0..n)
        .map(|i| sample_variance(&ratings.subject(i)))
        .sum::<Result<f64>>()?
        / n as f64;
    let msc = sample_variance(ratings.rater_means().as_slice())? * n as f64;
    let mse = (ss_total - msr * (n - 1) as f64 - msc * (k - 1) as f64)
        / ((n - 1) * (k - 1)) as f64;

    let ms = MeanSquares {
        msr,
        msw,
        msc,
        mse,
        ss_total,
        n,
        k,
    };
    debug!(
        "Decomposed {}x{} ratings: MSR={:.6e} MSC={:.6e} MSW={:.6e} MSE={:.6e}",
        n, k, msr, msc, msw, mse
    );
    ms.check_degenerate()?;
    Ok(ms)
}
