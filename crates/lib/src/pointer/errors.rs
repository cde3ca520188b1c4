//! Error types for ownership wrappers.

use thiserror::Error;

/// Errors raised when dereferencing or converting a [`Pointer`](super::Pointer).
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointerError {
    /// The pointer is empty, or the value it borrowed no longer exists.
    #[error("Invalid pointer to {type_name}: {reason}")]
    InvalidPointer {
        /// Type the pointer points to
        type_name: String,
        /// Why the pointer cannot be dereferenced
        reason: String,
    },

    /// An ownership promotion that would hide a copy was refused.
    #[error("Conversion of pointer to {type_name} disabled: {reason}")]
    Disabled {
        /// Type the pointer points to
        type_name: String,
        /// Why the conversion is refused
        reason: String,
    },
}

impl PointerError {
    /// Check if the pointer could not be dereferenced
    pub fn is_invalid_pointer(&self) -> bool {
        matches!(self, PointerError::InvalidPointer { .. })
    }

    /// Check if a conversion was refused
    pub fn is_disabled(&self) -> bool {
        matches!(self, PointerError::Disabled { .. })
    }

    /// Get the pointee type name
    pub fn type_name(&self) -> &str {
        match self {
            PointerError::InvalidPointer { type_name, .. }
            | PointerError::Disabled { type_name, .. } => type_name,
        }
    }
}

impl From<PointerError> for crate::Error {
    fn from(err: PointerError) -> Self {
        crate::Error::Pointer(err)
    }
}
