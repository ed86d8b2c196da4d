//! Error types for the coverage kernel.

/// Result type alias
pub type Result<T> = core::result::Result<T, CoverageError>;

/// Coverage kernel error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoverageError {
    /// The geometry-wide coverage matrix would exceed the caller's size ceiling
    #[error(
        "coverage matrix of {rows}x{cols} cells needs {bytes} bytes, exceeding the ceiling of {ceiling} bytes"
    )]
    AllocationTooLarge {
        /// Rows of the matrix that would have been allocated
        rows: usize,
        /// Columns of the matrix that would have been allocated
        cols: usize,
        /// Estimated size in bytes
        bytes: u128,
        /// Ceiling that was exceeded
        ceiling: u128,
    },

    /// Degenerate ring or unsupported geometry type
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Matrix access outside its bounds
    #[error("index ({row}, {col}) out of range for a {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Grid with non-positive or non-finite cell size or origin
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Sparse encoder tolerance outside `(0, 1)`
    #[error("invalid tolerance {0}: must lie strictly between 0 and 1")]
    InvalidTolerance(f64),
}
