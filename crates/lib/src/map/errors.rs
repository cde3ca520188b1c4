//! Error types for map operations.

use thiserror::Error;

/// Errors raised by [`Map`](super::Map) lookups.
///
/// Type mismatches and pointer failures surface as
/// [`CellError`](crate::CellError) and [`PointerError`](crate::PointerError).
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// A required key is absent.
    #[error("Unknown key: {key}")]
    UnknownKey {
        /// The resolved, absolute key
        key: String,
    },
}

impl MapError {
    /// Check if this error indicates a key was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, MapError::UnknownKey { .. })
    }

    /// Get the key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            MapError::UnknownKey { key } => Some(key),
        }
    }
}

impl From<MapError> for crate::Error {
    fn from(err: MapError) -> Self {
        crate::Error::Map(err)
    }
}
