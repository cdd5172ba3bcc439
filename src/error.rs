use core::fmt;

/// Library-wide operational error.
///
/// Ingestion deliberately never fails: NaN means and NaN/non-positive weights
/// are dropped so a noisy producer cannot halt aggregation. The only
/// operational path that surfaces an error is centroid absorption, and only
/// for a negative weight. Wire decoding has its own error type in
/// [`crate::tdigest::wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TdError {
    /// Centroid absorption was handed a negative weight.
    WeightNegative,

    /// Digest construction received an out-of-range parameter.
    /// `context` states which parameter and what it must satisfy.
    InvalidConfig { context: &'static str },
}

impl fmt::Display for TdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TdError::WeightNegative => {
                write!(f, "centroid weight cannot be less than zero")
            }
            TdError::InvalidConfig { context } => {
                write!(f, "invalid digest configuration: {}", context)
            }
        }
    }
}

impl std::error::Error for TdError {}

pub type TdResult<T> = Result<T, TdError>;
