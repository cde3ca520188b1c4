//! Ownership wrapper over owned and borrowed values.
//!
//! A [`Pointer<T>`] points at a `T` that is either
//!
//! - **shared**: owned through an `Arc<RwLock<T>>`, kept alive by every pointer
//!   that shares it, or
//! - **borrowed**: owned by someone else (usually a [`Tracked<T>`](crate::Tracked)),
//!   referenced weakly and, in checked mode, registered with the owner.
//!
//! Both kinds are dereferenced the same way, through [`Pointer::with`] and
//! [`Pointer::with_mut`]. The difference shows up when converting to an owning
//! handle: a shared pointer hands out its `Arc`, while a borrowed pointer
//! refuses in checked mode ([`PointerError::Disabled`]) because promoting it
//! would silently copy the value. The copy has to be requested explicitly with
//! [`Pointer::deep_copy`].
//!
//! ```rust
//! use genmap::{CheckMode, Pointer, Tracked};
//!
//! let owned = Pointer::new(3_u32);
//! assert!(owned.is_shared_ptr());
//! assert_eq!(owned.get().unwrap(), 3);
//!
//! let tracked = Tracked::with_mode(7_u32, CheckMode::Checked);
//! let borrowed = tracked.borrow();
//! assert!(!borrowed.is_shared_ptr());
//! assert!(borrowed.clone().into_shared().unwrap_err().is_disabled());
//! assert_eq!(*borrowed.deep_copy().unwrap().read().unwrap(), 7);
//! ```

use std::{
    any::type_name,
    fmt,
    sync::{Arc, PoisonError, RwLock, Weak},
};

use crate::{CheckMode, lifetime::Lease};

pub mod errors;

pub use errors::PointerError;

enum Target<T> {
    Null,
    Shared(Arc<RwLock<T>>),
    Borrowed {
        target: Weak<RwLock<T>>,
        lease: Option<Lease>,
    },
}

/// A pointer to a `T` that is either shared-owned or borrowed.
pub struct Pointer<T> {
    target: Target<T>,
    mode: CheckMode,
}

impl<T> Pointer<T> {
    /// Creates an empty pointer.
    pub fn null() -> Self {
        Pointer {
            target: Target::Null,
            mode: CheckMode::default(),
        }
    }

    /// Allocates `value` and returns a shared pointer to it.
    pub fn new(value: T) -> Self {
        Self::from_shared(Arc::new(RwLock::new(value)))
    }

    /// Wraps an existing shared handle.
    pub fn from_shared(value: Arc<RwLock<T>>) -> Self {
        Pointer {
            target: Target::Shared(value),
            mode: CheckMode::default(),
        }
    }

    pub(crate) fn borrowed(target: Weak<RwLock<T>>, lease: Option<Lease>, mode: CheckMode) -> Self {
        Pointer {
            target: Target::Borrowed { target, lease },
            mode,
        }
    }

    /// Returns this pointer with `mode` governing its conversions.
    pub fn with_mode(mut self, mode: CheckMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Returns `true` for an empty pointer.
    pub fn is_null(&self) -> bool {
        matches!(self.target, Target::Null)
    }

    /// Returns `true` if the pointer can currently be dereferenced.
    pub fn is_valid(&self) -> bool {
        match &self.target {
            Target::Null => false,
            Target::Shared(_) => true,
            Target::Borrowed { target, .. } => target.strong_count() > 0,
        }
    }

    /// Returns `true` if the pointer owns (a share of) its value.
    pub fn is_shared_ptr(&self) -> bool {
        matches!(self.target, Target::Shared(_))
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self.target, Target::Borrowed { .. })
    }

    /// Address of the pointee, null for an empty pointer.
    ///
    /// A borrowed pointer keeps reporting the address after its value is gone.
    pub fn addr(&self) -> *const () {
        match &self.target {
            Target::Null => std::ptr::null(),
            Target::Shared(value) => Arc::as_ptr(value).cast(),
            Target::Borrowed { target, .. } => target.as_ptr().cast(),
        }
    }

    fn invalid(&self, reason: &str) -> PointerError {
        PointerError::InvalidPointer {
            type_name: type_name::<T>().to_string(),
            reason: reason.to_string(),
        }
    }

    /// A strong handle for the duration of one access.
    fn acquire(&self) -> Result<Arc<RwLock<T>>, PointerError> {
        match &self.target {
            Target::Null => Err(self.invalid("pointer is empty")),
            Target::Shared(value) => Ok(Arc::clone(value)),
            Target::Borrowed { target, .. } => target
                .upgrade()
                .ok_or_else(|| self.invalid("borrowed value no longer exists")),
        }
    }

    /// Calls `f` with a shared reference to the pointee.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, PointerError> {
        let value = self.acquire()?;
        let guard = value.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&guard))
    }

    /// Calls `f` with a mutable reference to the pointee.
    ///
    /// The change is visible through every pointer to the same value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, PointerError> {
        let value = self.acquire()?;
        let mut guard = value.write().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut guard))
    }

    /// Replaces the pointee in place.
    pub fn set(&self, value: T) -> Result<(), PointerError> {
        self.with_mut(|slot| *slot = value)
    }

    /// Returns the owning handle of a shared pointer without copying.
    pub fn shared(&self) -> Option<Arc<RwLock<T>>> {
        match &self.target {
            Target::Shared(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Returns a borrowed pointer to the same value.
    ///
    /// A borrowed pointer re-exposes itself. A shared pointer yields a weak
    /// pointer that does not keep the value alive.
    pub fn downgrade(&self) -> Pointer<T> {
        match &self.target {
            Target::Null => Pointer::null().with_mode(self.mode),
            Target::Shared(value) => Pointer::borrowed(Arc::downgrade(value), None, self.mode),
            Target::Borrowed { .. } => self.clone(),
        }
    }
}

impl<T: Clone> Pointer<T> {
    /// Returns a copy of the pointee.
    pub fn get(&self) -> Result<T, PointerError> {
        self.with(T::clone)
    }

    /// Copies the pointee into a freshly allocated shared handle.
    pub fn deep_copy(&self) -> Result<Arc<RwLock<T>>, PointerError> {
        let value = self.get()?;
        Ok(Arc::new(RwLock::new(value)))
    }

    /// Converts into an owning handle.
    ///
    /// Shared pointers convert without copying. Borrowed pointers are refused
    /// with [`PointerError::Disabled`] in checked mode and copied in unchecked
    /// mode.
    pub fn into_shared(self) -> Result<Arc<RwLock<T>>, PointerError> {
        match &self.target {
            Target::Shared(value) => Ok(Arc::clone(value)),
            Target::Null => Err(self.invalid("pointer is empty")),
            Target::Borrowed { .. } if self.mode.is_checked() => Err(PointerError::Disabled {
                type_name: type_name::<T>().to_string(),
                reason: "borrowed pointer cannot become owning without a copy, use deep_copy()"
                    .to_string(),
            }),
            Target::Borrowed { .. } => self.deep_copy(),
        }
    }
}

impl<T> Clone for Pointer<T> {
    fn clone(&self) -> Self {
        let target = match &self.target {
            Target::Null => Target::Null,
            Target::Shared(value) => Target::Shared(Arc::clone(value)),
            Target::Borrowed { target, lease } => Target::Borrowed {
                target: target.clone(),
                lease: lease.clone(),
            },
        };
        Pointer {
            target,
            mode: self.mode,
        }
    }
}

impl<T> Default for Pointer<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Arc<RwLock<T>>> for Pointer<T> {
    fn from(value: Arc<RwLock<T>>) -> Self {
        Self::from_shared(value)
    }
}

/// Pointers compare by address, regardless of ownership.
impl<T> PartialEq for Pointer<T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl<T> Eq for Pointer<T> {}

impl<T> fmt::Debug for Pointer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.target {
            Target::Null => "null",
            Target::Shared(_) => "shared",
            Target::Borrowed { .. } => "borrowed",
        };
        f.debug_struct("Pointer")
            .field("type_name", &type_name::<T>())
            .field("kind", &kind)
            .field("addr", &self.addr())
            .finish()
    }
}
