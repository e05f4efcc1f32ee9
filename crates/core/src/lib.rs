//! Intraclass correlation coefficients for rater-agreement studies.
//!
//! A subjects-by-raters [`data::RatingMatrix`] is decomposed into two-way
//! ANOVA mean squares ([`variance::decompose`]), which feed the consistency
//! estimators ICC(C,k) and ICC(C,1) in [`icc`]. Significance tests and
//! confidence intervals use the F distribution ([`distribution`]).

pub mod data;
pub mod distribution;
pub mod error;
pub mod icc;
pub mod types;
pub mod variance;

pub use error::{ErrorKind, IccError, Result};
pub use icc::{compute_icc, IccConfig, IccResult, IccType};
