//!
//! genmap: hierarchical, type-erased key-value maps.
//!
//! This library provides a map that stores values of arbitrary types under
//! filesystem-like keys, and lets callers carve it into scoped views that share
//! one backing store. It is meant for passing configuration and data between
//! the components of numerical codes, where each component only sees its own
//! subtree.
//!
//! ## Core Concepts
//!
//! * **Keys (`path::Key`)**: Canonical absolute paths such as `/solver/tolerance`.
//!   User keys are resolved relative to a view's location; `.`, `..` and
//!   repeated slashes are normalised and `..` never leaves the view.
//! * **Maps (`map::Map`)**: A view onto an ordered store of keys to cells. Views
//!   created with `submap` alias the store; clones get a store of their own.
//! * **Cells (`cell::Cell`)**: Type-erased containers for one value, checked
//!   against the requested type on every access.
//! * **Pointers (`pointer::Pointer`)**: Handles that are either shared owners of
//!   a value or borrowers of a value owned elsewhere.
//! * **Tracked values (`lifetime::Tracked`)**: Caller-owned values that count
//!   their outstanding borrows and refuse to be released while borrowed.
//! * **Check modes (`config::CheckMode`)**: Runtime switch between full
//!   diagnostic bookkeeping and the fast path.
//!
//! ```rust
//! use genmap::genmap;
//!
//! let map = genmap! {
//!     "dum" => 1_i32,
//!     "tree/i" => 2_i32,
//!     "tree/value" => 3.5_f64,
//! };
//! let keys: Vec<String> = map
//!     .submap("tree")
//!     .iter()
//!     .map(|entry| entry.key().to_string())
//!     .collect();
//! assert_eq!(keys, ["/i", "/value"]);
//! ```

pub mod cell;
pub mod config;
pub mod lifetime;
pub mod map;
pub mod path;
pub mod pointer;

pub use cell::{Cell, CellError, Storage};
pub use config::CheckMode;
pub use lifetime::{BorrowId, LifetimeError, Tracked};
pub use map::{Entry, Iter, Map, MapError};
pub use path::{Key, KeyBuf};
pub use pointer::{Pointer, PointerError};

/// Result type used throughout the genmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the genmap library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured map errors from the map module
    #[error(transparent)]
    Map(map::MapError),

    /// Structured cell errors from the cell module
    #[error(transparent)]
    Cell(cell::CellError),

    /// Structured pointer errors from the pointer module
    #[error(transparent)]
    Pointer(pointer::PointerError),

    /// Structured lifetime errors from the lifetime module
    #[error(transparent)]
    Lifetime(lifetime::LifetimeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Map(_) => "map",
            Error::Cell(_) => "cell",
            Error::Pointer(_) => "pointer",
            Error::Lifetime(_) => "lifetime",
        }
    }

    /// Check if this error indicates a key was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a type mismatch.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Cell(cell_err) => cell_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error comes from dereferencing an invalid pointer.
    pub fn is_invalid_pointer(&self) -> bool {
        match self {
            Error::Pointer(pointer_err) => pointer_err.is_invalid_pointer(),
            _ => false,
        }
    }

    /// Check if this error is a refused ownership promotion.
    pub fn is_disabled(&self) -> bool {
        match self {
            Error::Pointer(pointer_err) => pointer_err.is_disabled(),
            _ => false,
        }
    }

    /// Check if this error reports a tracked value released while borrowed.
    pub fn is_still_in_use(&self) -> bool {
        match self {
            Error::Lifetime(lifetime_err) => lifetime_err.is_still_in_use(),
            _ => false,
        }
    }

    /// Check if this error is pointer-related.
    pub fn is_pointer_error(&self) -> bool {
        matches!(self, Error::Pointer(_))
    }

    /// Check if this error is lifetime-related.
    pub fn is_lifetime_error(&self) -> bool {
        matches!(self, Error::Lifetime(_))
    }
}

/// Builds a root [`Map`] from `key => value` pairs of any types.
///
/// ```rust
/// use genmap::genmap;
///
/// let map = genmap! {
///     "x/1" => 1_i32,
///     "x/2" => 2_i32,
///     "y" => String::from("three"),
/// };
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.get::<String>("y").unwrap(), "three");
/// ```
#[macro_export]
macro_rules! genmap {
    () => {
        $crate::Map::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let map = $crate::Map::new();
        $( map.update($key, $value); )+
        map
    }};
}
