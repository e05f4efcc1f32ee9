//! Consistency intraclass correlation with F-based inference.
//!
//! The entry point is [`compute_icc`]: decompose the rating matrix into mean
//! squares, route them to the estimator selected by [`IccConfig::icc_type`],
//! and derive the p-value and confidence interval from the F distribution.
//!
//! ```
//! use icc_core::data::RatingMatrix;
//! use icc_core::icc::{compute_icc, IccConfig, IccType};
//!
//! let ratings = RatingMatrix::from_rows(&[
//!     vec![9.0, 2.0],
//!     vec![6.0, 1.0],
//!     vec![8.0, 4.0],
//!     vec![7.0, 1.0],
//!     vec![10.0, 5.0],
//! ])
//! .unwrap();
//!
//! let result = compute_icc(&ratings, &IccConfig::new().icc_type(IccType::ConsistencyAverage)).unwrap();
//! assert_eq!((result.df1, result.df2), (4, 4));
//! assert!(result.lb < result.r && result.r < result.ub);
//! ```

mod config;
mod estimator;
mod result;
mod types;

use log::{debug, warn};

use crate::data::RatingMatrix;
use crate::error::Result;
use crate::variance::{decompose, MeanSquares};

pub use config::IccConfig;
pub use estimator::{consistency_average, consistency_single};
pub use result::IccResult;
pub use types::IccType;

/// Compute the ICC selected by `config` for a rating matrix.
///
/// # Errors
/// - invalid configuration (`alpha` outside (0, 1), non-finite `r0`, or
///   `1 + (k - 1) * r0 <= 0` for C-1);
/// - degenerate statistics when MSR or MSE vanish (e.g. every subject rated
///   identically by all raters);
/// - distribution failures from the F quantile/CDF.
pub fn compute_icc(ratings: &RatingMatrix, config: &IccConfig) -> Result<IccResult> {
    let ms = decompose(ratings)?;
    estimate(&ms, config)
}

/// Run the estimator selected by `config` on precomputed mean squares.
pub fn estimate(ms: &MeanSquares, config: &IccConfig) -> Result<IccResult> {
    config.validate()?;
    debug!(
        "ICC({}) on n={} k={} with alpha={} r0={}",
        config.icc_type, ms.n, ms.k, config.alpha, config.r0
    );

    let result = match config.icc_type {
        IccType::ConsistencyAverage => consistency_average(ms, config.alpha, config.r0)?,
        IccType::ConsistencySingle => consistency_single(ms, config.alpha, config.r0)?,
    };

    if result.r < 0.0 {
        warn!(
            "Negative ICC({}) = {:.4}: residual variation exceeds between-subject variation",
            config.icc_type, result.r
        );
    }
    if result.df2 == 1 {
        warn!("Only one residual degree of freedom; the confidence interval is very wide");
    }

    Ok(result)
}

/// Compute every consistency variant on the same decomposition.
pub fn compute_all(ratings: &RatingMatrix, alpha: f64, r0: f64) -> Result<Vec<(IccType, IccResult)>> {
    let ms = decompose(ratings)?;
    IccType::ALL
        .iter()
        .map(|&icc_type| {
            let config = IccConfig::new().icc_type(icc_type).alpha(alpha).r0(r0);
            estimate(&ms, &config).map(|res| (icc_type, res))
        })
        .collect()
}

/// One-call form taking plain rows and the variant name (`"C-k"` or `"C-1"`).
///
/// # Errors
/// [`crate::IccError::UnknownIccType`] for an unrecognized `icc_type`, plus
/// everything [`compute_icc`] can return.
pub fn compute_icc_from_rows(
    rows: &[Vec<f64>],
    icc_type: &str,
    alpha: f64,
    r0: f64,
) -> Result<IccResult> {
    let config = IccConfig::new()
        .icc_type(icc_type.parse()?)
        .alpha(alpha)
        .r0(r0);
    let ratings = RatingMatrix::from_rows(rows)?;
    compute_icc(&ratings, &config)
}
