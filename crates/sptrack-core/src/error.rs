//! Typed errors raised by the track-table and step-extraction APIs.
//!
//! The algorithmic modules return [`StepsError`] so callers can match on the
//! failure kind; file-level helpers in [`crate::io`] wrap these into
//! `anyhow::Error` with path context.

use thiserror::Error;

/// Failure kinds for validation, typed row extraction, and lag checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepsError {
    /// The track table lacks one or more required columns (sorted names).
    #[error("tracks is missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// A requested lag is smaller than one frame.
    #[error("tau_frames must be >= 1 (got {0})")]
    InvalidLag(i64),

    /// A column holds values of the wrong scalar type.
    #[error("column `{column}` must hold {expected} values")]
    ColumnType {
        /// Offending column name.
        column: String,
        /// Human-readable expected type.
        expected: &'static str,
    },

    /// A column length disagrees with the table's row count.
    #[error("column `{column}` has {len} rows, expected {expected}")]
    RaggedColumn {
        /// Offending column name.
        column: String,
        /// Observed length.
        len: usize,
        /// Row count of the table.
        expected: usize,
    },

    /// A column name was inserted twice.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),
}
