//! Error types for lifetime tracking.

use thiserror::Error;

/// Errors raised by [`Tracked`](super::Tracked) values.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifetimeError {
    /// A tracked value was released while borrowed pointers to it remain.
    #[error("Tracked {type_name} released while still in use by {borrows} borrow(s)")]
    StillInUse {
        /// Type of the tracked value
        type_name: String,
        /// Number of outstanding borrows at release time
        borrows: usize,
    },
}

impl LifetimeError {
    /// Check if this error reports outstanding borrows.
    pub fn is_still_in_use(&self) -> bool {
        matches!(self, LifetimeError::StillInUse { .. })
    }

    /// Number of outstanding borrows, if relevant.
    pub fn borrows(&self) -> Option<usize> {
        match self {
            LifetimeError::StillInUse { borrows, .. } => Some(*borrows),
        }
    }
}

impl From<LifetimeError> for crate::Error {
    fn from(err: LifetimeError) -> Self {
        crate::Error::Lifetime(err)
    }
}
