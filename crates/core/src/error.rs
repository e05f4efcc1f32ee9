use thiserror::Error;

#[derive(Error, Debug)]
pub enum IccError {
    #[error("Data error: {0}")]
    Data(String),

    #[error("At least 2 subjects (rows) are required, got {0}")]
    TooFewSubjects(usize),

    #[error("At least 2 raters (columns) are required, got {0}")]
    TooFewRaters(usize),

    #[error("Non-finite measurement {value} at subject {row}, rater {col}")]
    NonFinite { row: usize, col: usize, value: f64 },

    #[error("Dimension mismatch: expected {expected}, got {got} in {context}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("Significance level alpha must lie in (0, 1), got {0}")]
    InvalidAlpha(f64),

    #[error("Invalid null-hypothesis value r0 = {r0}: {reason}")]
    InvalidNullValue { r0: f64, reason: String },

    #[error("Unknown ICC type '{0}' (expected \"C-k\" or \"C-1\")")]
    UnknownIccType(String),

    #[error("Degenerate statistics: {quantity} = {value:e}")]
    Degenerate { quantity: &'static str, value: f64 },

    #[error("F-distribution error: {0}")]
    Distribution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse classification of an [`IccError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The measurement matrix cannot be analysed (shape, missing or non-finite cells).
    InvalidInput,
    /// `alpha`, `r0` or the ICC type are out of range.
    InvalidConfiguration,
    /// A mean square that is used as a divisor vanished.
    DegenerateStatistics,
    /// The distribution library rejected its parameters.
    Numerical,
    /// Reading input failed.
    Io,
}

impl IccError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IccError::Data(_)
            | IccError::TooFewSubjects(_)
            | IccError::TooFewRaters(_)
            | IccError::NonFinite { .. }
            | IccError::DimensionMismatch { .. } => ErrorKind::InvalidInput,
            IccError::InvalidAlpha(_)
            | IccError::InvalidNullValue { .. }
            | IccError::UnknownIccType(_) => ErrorKind::InvalidConfiguration,
            IccError::Degenerate { .. } => ErrorKind::DegenerateStatistics,
            IccError::Distribution(_) => ErrorKind::Numerical,
            IccError::Io(_) | IccError::Csv(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, IccError>;
