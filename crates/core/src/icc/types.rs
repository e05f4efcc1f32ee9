use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::IccError;

/// Which consistency ICC to estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum IccType {
    /// ICC(C,k): consistency of the average of the `k` raters.
    #[default]
    #[serde(rename = "C-k")]
    ConsistencyAverage,
    /// ICC(C,1): consistency of a single rater's measurement.
    #[serde(rename = "C-1")]
    ConsistencySingle,
}

impl IccType {
    pub const ALL: [IccType; 2] = [IccType::ConsistencyAverage, IccType::ConsistencySingle];

    pub fn description(&self) -> &'static str {
        match self {
            IccType::ConsistencyAverage => "consistency of the mean of k measurements",
            IccType::ConsistencySingle => "consistency of a single measurement",
        }
    }
}

impl fmt::Display for IccType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IccType::ConsistencyAverage => write!(f, "C-k"),
            IccType::ConsistencySingle => write!(f, "C-1"),
        }
    }
}

impl FromStr for IccType {
    type Err = IccError;

    /// Accepts `C-k` / `C-1` in any case, with `-`, `_` or no separator
    /// (`ck`, `C_1`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "ck" => Ok(IccType::ConsistencyAverage),
            "c1" => Ok(IccType::ConsistencySingle),
            _ => Err(IccError::UnknownIccType(s.to_string())),
        }
    }
}
