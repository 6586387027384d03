//! Error types for table operations.

use thiserror::Error;

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, BhptError>;

/// Main error type for table operations.
///
/// All variants are non-fatal: the table never retries internally and never
/// partially applies a mutation, so the caller can always recover by
/// adjusting its request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BhptError {
    /// `insert` was called on a full table with auto-removal disabled.
    #[error("table is full ({capacity} entries) and auto-removal is disabled")]
    NoCapacity {
        /// Total number of entries the table can hold.
        capacity: usize,
    },

    /// An entry index outside `[0, capacity)`.
    #[error("index {index} is out of range for a table of {capacity} entries")]
    InvalidIndex {
        /// The offending index.
        index: usize,
        /// Total number of entries the table can hold.
        capacity: usize,
    },

    /// A construction parameter or knob outside its legal range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `select` was called on a table whose total weight is zero: either no
    /// entry is valid, or every valid history is all-zero with the minimal
    /// weight state position disabled.
    #[error("no selectable entry: total weight is zero")]
    NoSelectableEntry,
}
