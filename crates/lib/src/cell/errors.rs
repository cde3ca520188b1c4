//! Error types for type-erased value cells.

use thiserror::Error;

/// Errors raised when extracting a value from a [`Cell`](super::Cell).
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellError {
    /// The cell was never initialized.
    #[error("Cell is empty")]
    Empty,

    /// The requested type differs from the stored one.
    #[error("Wrong type requested: expected {expected}, found {actual}")]
    WrongTypeRequested {
        /// Type the caller asked for
        expected: String,
        /// Type stored in the cell, `<unchecked>` when no name was recorded
        actual: String,
    },
}

impl CellError {
    /// Check if this error is a type mismatch
    pub fn is_type_error(&self) -> bool {
        matches!(self, CellError::WrongTypeRequested { .. })
    }

    /// Check if the cell was empty
    pub fn is_empty_error(&self) -> bool {
        matches!(self, CellError::Empty)
    }
}

impl From<CellError> for crate::Error {
    fn from(err: CellError) -> Self {
        crate::Error::Cell(err)
    }
}
