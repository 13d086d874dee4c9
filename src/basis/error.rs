//! Error types for reference-element numerics.

use thiserror::Error;

/// Errors raised while building nodes, bases or resampling operators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BasisError {
    /// No reference numerics exist for this simplex dimension.
    #[error("unsupported simplex dimension: {0}")]
    UnsupportedDimension(usize),

    /// Point set has the wrong number of coordinates per point.
    #[error("point dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Source point count must equal the number of basis functions.
    #[error("source point set is not unisolvent: expected {expected} points, got {actual}")]
    NodeCountMismatch { expected: usize, actual: usize },

    /// Values handed to a resampling operator have the wrong width.
    #[error("value count mismatch: expected {expected}, got {actual}")]
    ValueCountMismatch { expected: usize, actual: usize },
}
