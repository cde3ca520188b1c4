//! Runtime check configuration.
//!
//! Every [`Map`](crate::Map), [`Pointer`](crate::Pointer) and
//! [`Tracked`](crate::Tracked) carries a [`CheckMode`]. The mode decides whether
//! the diagnostic bookkeeping is done:
//!
//! - [`CheckMode::Checked`]: stored type names are recorded, every borrow of a
//!   tracked value is registered, and silently promoting a borrowed pointer to
//!   an owning one is refused.
//! - [`CheckMode::Unchecked`]: none of the above. Type names read as
//!   `"<unchecked>"`, borrow registration is skipped and a borrowed pointer is
//!   promoted by copying its value.
//!
//! Type identity is compared in both modes. Callers that need to skip even
//! that comparison use the `unsafe` unchecked accessors.
//!
//! The build default follows the `checked` cargo feature and is what
//! `CheckMode::default()` returns. The `GENMAP_CHECK_MODE` environment variable
//! is only consulted by callers of [`CheckMode::from_env`]; constructors never
//! read it.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Environment variable read by [`CheckMode::from_env`].
pub const CHECK_MODE_ENV: &str = "GENMAP_CHECK_MODE";

/// Placeholder returned by `type_name()` when no name was recorded.
pub const UNCHECKED_TYPE_NAME: &str = "<unchecked>";

/// Whether diagnostic checks are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMode {
    /// Record type names, track borrows, refuse implicit ownership promotion.
    Checked,
    /// Skip all diagnostic bookkeeping.
    Unchecked,
}

/// Error returned when parsing a [`CheckMode`] from a string fails.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown check mode '{0}', expected 'checked' or 'unchecked'")]
pub struct ParseCheckModeError(String);

impl CheckMode {
    /// The mode selected at compile time by the `checked` feature.
    pub const fn build_default() -> Self {
        if cfg!(feature = "checked") {
            CheckMode::Checked
        } else {
            CheckMode::Unchecked
        }
    }

    /// Reads the mode from `GENMAP_CHECK_MODE`.
    ///
    /// Unset, empty or unparsable values fall back to [`CheckMode::build_default`];
    /// unparsable values are logged.
    pub fn from_env() -> Self {
        match std::env::var(CHECK_MODE_ENV) {
            Ok(value) if !value.trim().is_empty() => value.parse().unwrap_or_else(|err| {
                tracing::warn!(%err, "Ignoring {CHECK_MODE_ENV}");
                Self::build_default()
            }),
            _ => Self::build_default(),
        }
    }

    pub fn is_checked(self) -> bool {
        self == CheckMode::Checked
    }
}

impl Default for CheckMode {
    fn default() -> Self {
        Self::build_default()
    }
}

impl FromStr for CheckMode {
    type Err = ParseCheckModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checked" | "strict" | "debug" => Ok(CheckMode::Checked),
            "unchecked" | "fast" | "release" => Ok(CheckMode::Unchecked),
            _ => Err(ParseCheckModeError(s.to_string())),
        }
    }
}

impl fmt::Display for CheckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckMode::Checked => write!(f, "checked"),
            CheckMode::Unchecked => write!(f, "unchecked"),
        }
    }
}
