use crate::distribution::{f_cdf, f_quantile};
use crate::error::{IccError, Result};
use crate::variance::MeanSquares;

use super::config::{validate_alpha, validate_r0};
use super::result::IccResult;

/// Quantities shared by both consistency estimators.
struct Inference {
    ratio: f64,
    df1: usize,
    df2: usize,
    /// Lower bound for the variance ratio MSR/MSE.
    fl: f64,
    /// Upper bound for the variance ratio MSR/MSE.
    fu: f64,
}

fn inference(ms: &MeanSquares, alpha: f64, r0: f64) -> Result<Inference> {
    validate_alpha(alpha)?;
    validate_r0(r0)?;
    if ms.n < 2 {
        return Err(IccError::TooFewSubjects(ms.n));
    }
    if ms.k < 2 {
        return Err(IccError::TooFewRaters(ms.k));
    }
    if ms.msr.is_nan() || ms.msr <= 0.0 {
        return Err(IccError::Degenerate {
            quantity: "MSR",
            value: ms.msr,
        });
    }
    if ms.mse.is_nan() || ms.mse <= 0.0 {
        return Err(IccError::Degenerate {
            quantity: "MSE",
            value: ms.mse,
        });
    }

    let ratio = ms.variance_ratio();
    let df1 = ms.df_rows();
    let df2 = ms.df_error();
    let level = 1.0 - alpha / 2.0;

    // The upper bound uses the swapped degrees of freedom.
    let fl = ratio / f_quantile(level, df1 as f64, df2 as f64)?;
    let fu = ratio * f_quantile(level, df2 as f64, df1 as f64)?;

    Ok(Inference {
        ratio,
        df1,
        df2,
        fl,
        fu,
    })
}

/// ICC(C,k): consistency of the average of `k` raters.
///
/// ```text
/// r  = (MSR - MSE) / MSR
/// F  = (MSR / MSE) * (1 - r0)
/// LB = 1 - 1 / FL,  UB = 1 - 1 / FU
/// ```
///
/// Only MSR and MSE enter: rater differences (MSC) are not a source of
/// inconsistency in this form, and MSW is not needed.
pub fn consistency_average(ms: &MeanSquares, alpha: f64, r0: f64) -> Result<IccResult> {
    let inf = inference(ms, alpha, r0)?;

    let f = inf.ratio * (1.0 - r0);
    let p = 1.0 - f_cdf(f, inf.df1 as f64, inf.df2 as f64)?;

    IccResult {
        r: (ms.msr - ms.mse) / ms.msr,
        f,
        df1: inf.df1,
        df2: inf.df2,
        p,
        lb: 1.0 - 1.0 / inf.fl,
        ub: 1.0 - 1.0 / inf.fu,
    }
    .checked()
    .map(IccResult::bracketed)
}

/// ICC(C,1): consistency of a single rater's measurement.
///
/// ```text
/// r  = (MSR - MSE) / (MSR + (k - 1) * MSE)
/// F  = (MSR / MSE) * (1 - r0) / (1 + (k - 1) * r0)
/// LB = (FL - 1) / (FL + k - 1),  UB = (FU - 1) / (FU + k - 1)
/// ```
///
/// `FL`/`FU` bound the same variance ratio as in [`consistency_average`]; the
/// single-measure transform maps them onto the ICC scale so the interval
/// brackets `r`.
///
/// # Errors
/// Besides the shared checks, `1 + (k - 1) * r0` must be positive.
pub fn consistency_single(ms: &MeanSquares, alpha: f64, r0: f64) -> Result<IccResult> {
    let inf = inference(ms, alpha, r0)?;
    let k1 = (ms.k - 1) as f64;

    let null_scale = 1.0 + k1 * r0;
    if null_scale <= 0.0 {
        return Err(IccError::InvalidNullValue {
            r0,
            reason: format!("1 + (k - 1) * r0 must be positive for k = {}", ms.k),
        });
    }

    let f = inf.ratio * (1.0 - r0) / null_scale;
    let p = 1.0 - f_cdf(f, inf.df1 as f64, inf.df2 as f64)?;

    IccResult {
        r: (ms.msr - ms.mse) / (ms.msr + k1 * ms.mse),
        f,
        df1: inf.df1,
        df2: inf.df2,
        p,
        lb: (inf.fl - 1.0) / (inf.fl + k1),
        ub: (inf.fu - 1.0) / (inf.fu + k1),
    }
    .checked()
    .map(IccResult::bracketed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Mean squares of the 5 x 2 table [[9,2],[6,1],[8,4],[7,1],[10,5]].
    fn example() -> MeanSquares {
        MeanSquares {
            msr: 5.15,
            msw: 15.1,
            msc: 72.9,
            mse: 0.65,
            ss_total: 96.1,
            n: 5,
            k: 2,
        }
    }

    // F_{0.975}(4, 4), root of 3y^2 - 2y^3 = 0.975 with q = y / (1 - y).
    const Q975_4_4: f64 = 9.604_529_884_722_886;

    #[test]
    fn test_average_reference_values() {
        let res = consistency_average(&example(), 0.05, 0.0).unwrap();
        let ratio = 5.15 / 0.65;

        assert_relative_eq!(res.r, 4.5 / 5.15, epsilon = 1e-12);
        assert_relative_eq!(res.f, ratio, epsilon = 1e-12);
        assert_eq!((res.df1, res.df2), (4, 4));

        let y = ratio / (1.0 + ratio);
        let p = 1.0 - (3.0 * y * y - 2.0 * y * y * y);
        assert_relative_eq!(res.p, p, epsilon = 1e-9);

        assert_relative_eq!(res.lb, 1.0 - Q975_4_4 / ratio, epsilon = 1e-5);
        assert_relative_eq!(res.ub, 1.0 - 1.0 / (ratio * Q975_4_4), epsilon = 1e-5);
    }

    #[test]
    fn test_single_reference_values() {
        let res = consistency_single(&example(), 0.05, 0.0).unwrap();
        let ratio = 5.15 / 0.65;

        assert_relative_eq!(res.r, 4.5 / (5.15 + 0.65), epsilon = 1e-12);
        // With r0 = 0 the statistic is the plain variance ratio.
        assert_relative_eq!(res.f, ratio, epsilon = 1e-12);

        let fl = ratio / Q975_4_4;
        let fu = ratio * Q975_4_4;
        assert_relative_eq!(res.lb, (fl - 1.0) / (fl + 1.0), epsilon = 1e-5);
        assert_relative_eq!(res.ub, (fu - 1.0) / (fu + 1.0), epsilon = 1e-5);
        assert!(res.contains(res.r));
    }

    #[test]
    fn test_single_not_above_average() {
        let avg = consistency_average(&example(), 0.05, 0.0).unwrap();
        let single = consistency_single(&example(), 0.05, 0.0).unwrap();
        assert!(single.r < avg.r);
        // Same test statistic and p-value when r0 = 0.
        assert_eq!(single.p, avg.p);
    }

    #[test]
    fn test_null_adjustment_differs_between_variants() {
        let avg = consistency_average(&example(), 0.05, 0.4).unwrap();
        let single = consistency_single(&example(), 0.05, 0.4).unwrap();
        let ratio = 5.15 / 0.65;
        assert_relative_eq!(avg.f, ratio * 0.6, epsilon = 1e-12);
        assert_relative_eq!(single.f, ratio * 0.6 / 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_r0_at_or_above_one_gives_p_one() {
        let res = consistency_average(&example(), 0.05, 1.0).unwrap();
        assert_eq!(res.f, 0.0);
        assert_eq!(res.p, 1.0);
    }

    #[test]
    fn test_single_rejects_non_positive_null_scale() {
        // k = 2: 1 + r0 <= 0 for r0 <= -1
        let err = consistency_single(&example(), 0.05, -1.0).unwrap_err();
        assert!(matches!(err, IccError::InvalidNullValue { .. }));
    }

    #[test]
    fn test_zero_mean_squares_are_degenerate() {
        let ms = MeanSquares { mse: 0.0, ..example() };
        let err = consistency_average(&ms, 0.05, 0.0).unwrap_err();
        assert!(matches!(err, IccError::Degenerate { quantity: "MSE", .. }));

        let ms = MeanSquares { msr: 0.0, ..example() };
        let err = consistency_single(&ms, 0.05, 0.0).unwrap_err();
        assert!(matches!(err, IccError::Degenerate { quantity: "MSR", .. }));
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let err = consistency_average(&example(), 1.0, 0.0).unwrap_err();
        assert!(matches!(err, IccError::InvalidAlpha(_)));
    }

    #[test]
    fn test_single_rater_rejected() {
        let ms = MeanSquares { k: 1, ..example() };
        let err = consistency_single(&ms, 0.05, 0.0).unwrap_err();
        assert!(matches!(err, IccError::TooFewRaters(1)));
    }

    /// Two subjects, 30 raters: df1 = 1, df2 = 29.
    fn two_subjects_many_raters() -> MeanSquares {
        MeanSquares {
            msr: 100.0,
            msw: 0.0,
            msc: 0.0,
            mse: 0.01,
            ss_total: 0.0,
            n: 2,
            k: 30,
        }
    }

    #[test]
    fn test_large_alpha_interval_still_brackets_r() {
        // F_{0.6}(1, 29) < 1, so the raw lower bound would exceed r.
        assert!(f_quantile(0.6, 1.0, 29.0).unwrap() < 1.0);

        let ms = two_subjects_many_raters();
        for alpha in [0.8, 0.9] {
            let avg = consistency_average(&ms, alpha, 0.0).unwrap();
            assert_eq!(avg.lb, avg.r);
            assert!(avg.ub >= avg.r);

            let single = consistency_single(&ms, alpha, 0.0).unwrap();
            assert_eq!(single.lb, single.r);
            assert!(single.ub >= single.r);
        }

        // A conventional alpha leaves the interval untouched.
        let avg = consistency_average(&ms, 0.05, 0.0).unwrap();
        assert!(avg.lb < avg.r);
    }

    #[test]
    fn test_wider_interval_for_smaller_alpha() {
        let narrow = consistency_average(&example(), 0.2, 0.0).unwrap();
        let wide = consistency_average(&example(), 0.01, 0.0).unwrap();
        assert!(wide.lb < narrow.lb);
        assert!(wide.ub > narrow.ub);
    }
}
