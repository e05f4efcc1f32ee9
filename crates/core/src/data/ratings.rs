use crate::error::{IccError, Result};
use crate::types::{DenseMatrix, DenseVector};

/// A complete subjects-by-raters table of measurements.
///
/// Rows are subjects (the things being measured), columns are raters, methods
/// or trials. Construction validates the shape (at least 2 x 2) and that every
/// cell is finite.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    values: DenseMatrix,
    subject_labels: Vec<String>,
    rater_labels: Vec<String>,
}

impl RatingMatrix {
    /// Wrap an existing dense matrix.
    ///
    /// # Errors
    /// Returns [`IccError::TooFewSubjects`] / [`IccError::TooFewRaters`] for
    /// fewer than two rows / columns and [`IccError::NonFinite`] for NaN or
    /// infinite cells.
    pub fn from_matrix(values: DenseMatrix) -> Result<Self> {
        validate(&values)?;
        let subject_labels = (1..=values.nrows()).map(|i| format!("S{}", i)).collect();
        let rater_labels = (1..=values.ncols()).map(|j| format!("R{}", j)).collect();
        Ok(RatingMatrix {
            values,
            subject_labels,
            rater_labels,
        })
    }

    /// Build from one `Vec` per subject.
    ///
    /// # Examples
    /// ```
    /// use icc_core::data::RatingMatrix;
    ///
    /// let m = RatingMatrix::from_rows(&[vec![9.0, 2.0], vec![6.0, 1.0], vec![8.0, 4.0]]).unwrap();
    /// assert_eq!(m.n_subjects(), 3);
    /// assert_eq!(m.n_raters(), 2);
    /// ```
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(IccError::TooFewSubjects(n));
        }
        let k = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != k {
                return Err(IccError::DimensionMismatch {
                    expected: k,
                    got: row.len(),
                    context: format!("row {} of rating matrix", i),
                });
            }
        }
        Self::from_matrix(DenseMatrix::from_fn(n, k, |i, j| rows[i][j]))
    }

    /// Replace the default subject labels (`S1`, `S2`, ...).
    pub fn with_subject_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.n_subjects() {
            return Err(IccError::DimensionMismatch {
                expected: self.n_subjects(),
                got: labels.len(),
                context: "subject labels".to_string(),
            });
        }
        self.subject_labels = labels;
        Ok(self)
    }

    /// Replace the default rater labels (`R1`, `R2`, ...).
    pub fn with_rater_labels(mut self, labels: Vec<String>) -> Result<Self> {
        if labels.len() != self.n_raters() {
            return Err(IccError::DimensionMismatch {
                expected: self.n_raters(),
                got: labels.len(),
                context: "rater labels".to_string(),
            });
        }
        self.rater_labels = labels;
        Ok(self)
    }

    /// Number of subjects (`n`).
    pub fn n_subjects(&self) -> usize {
        self.values.nrows()
    }

    /// Number of raters (`k`).
    pub fn n_raters(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &DenseMatrix {
        &self.values
    }

    pub fn subject_labels(&self) -> &[String] {
        &self.subject_labels
    }

    pub fn rater_labels(&self) -> &[String] {
        &self.rater_labels
    }

    /// Measurements of one subject across all raters.
    pub fn subject(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }

    /// Mean of each subject's measurements (length `n`).
    pub fn subject_means(&self) -> DenseVector {
        DenseVector::from_iterator(
            self.n_subjects(),
            (0..self.n_subjects()).map(|i| self.values.row(i).mean()),
        )
    }

    /// Mean of each rater's measurements (length `k`).
    pub fn rater_means(&self) -> DenseVector {
        DenseVector::from_iterator(
            self.n_raters(),
            (0..self.n_raters()).map(|j| self.values.column(j).mean()),
        )
    }
}

fn validate(values: &DenseMatrix) -> Result<()> {
    if values.nrows() < 2 {
        return Err(IccError::TooFewSubjects(values.nrows()));
    }
    if values.ncols() < 2 {
        return Err(IccError::TooFewRaters(values.ncols()));
    }
    for i in 0..values.nrows() {
        for j in 0..values.ncols() {
            let value = values[(i, j)];
            if !value.is_finite() {
                return Err(IccError::NonFinite { row: i, col: j, value });
            }
        }
    }
    Ok(())
}
