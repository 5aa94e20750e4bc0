use thiserror::Error;

use crate::dtype::ElementKind;

/// Errors raised anywhere between ingestion and the native kernels.
///
/// Every failure is synchronous and surfaces at the first point it can be
/// detected. Nothing is retried or swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    #[error("Rank {rank} is not supported (expected 1..=4)")]
    UnsupportedRank { rank: usize },

    #[error("Element type {0} is not supported")]
    UnsupportedElementType(String),

    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),

    #[error("Index with {got} coordinate(s) is not compatible with a rank-{rank} tensor")]
    IndexArityMismatch { rank: usize, got: usize },

    #[error("Index {index} is out of bounds for axis {axis} with size {size}")]
    IndexOutOfBounds { axis: usize, index: usize, size: usize },

    #[error("No kernel registered for `{0}`")]
    UnknownOperation(String),

    #[error("Incompatible dtype: expected {expected}, got {got}")]
    IncompatibleDtype { expected: ElementKind, got: ElementKind },

    #[error("Cannot reshape {numel} elements into shape {shape:?}")]
    ReshapeSizeMismatch { numel: usize, shape: Vec<i64> },

    #[error("Dimension mismatch: {lhs:?} vs {rhs:?}")]
    DimensionMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    #[error("Axis {axis} is out of range for a rank-{rank} tensor")]
    InvalidAxis { axis: usize, rank: usize },

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = TensorError::UnsupportedRank { rank: 5 };
        assert_eq!(e.to_string(), "Rank 5 is not supported (expected 1..=4)");

        let e = TensorError::UnknownOperation("add_vectorf_tensor3f".into());
        assert!(e.to_string().contains("add_vectorf_tensor3f"));

        let e = TensorError::IncompatibleDtype {
            expected: ElementKind::Float32,
            got: ElementKind::Int32,
        };
        assert_eq!(e.to_string(), "Incompatible dtype: expected float32, got int32");
    }
}
