use thiserror::Error;

/// Errors raised by the ranking core.
///
/// None of these are recovered internally. A category without references or a
/// zero-length vector is reported to the caller instead of being scored as 0.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Degenerate vector: zero magnitude")]
    DegenerateVector,

    #[error("Non-finite embedding component at index {index}")]
    NonFiniteComponent { index: usize },

    #[error("Category has no reference embeddings: {0}")]
    EmptyCategory(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),
}

impl RankError {
    /// Returns a machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::DegenerateVector => "DEGENERATE_VECTOR",
            Self::NonFiniteComponent { .. } => "NON_FINITE_COMPONENT",
            Self::EmptyCategory(_) => "EMPTY_CATEGORY",
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::InvalidCapacity(_) => "INVALID_CAPACITY",
        }
    }
}

/// Result type alias for the ranking core
pub type Result<T> = std::result::Result<T, RankError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RankError::DimensionMismatch { expected: 2, got: 3 }.code(),
            "DIMENSION_MISMATCH"
        );
        assert_eq!(RankError::DegenerateVector.code(), "DEGENERATE_VECTOR");
        assert_eq!(
            RankError::UnknownCategory("angry".into()).code(),
            "UNKNOWN_CATEGORY"
        );
        assert_eq!(RankError::InvalidCapacity(0).code(), "INVALID_CAPACITY");
    }

    #[test]
    fn test_error_messages() {
        let err = RankError::DimensionMismatch { expected: 2, got: 3 };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 2, got 3");

        let err = RankError::EmptyCategory("sad".into());
        assert!(err.to_string().contains("sad"));
    }
}
