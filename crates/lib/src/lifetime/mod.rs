//! Lifetime tracking for values borrowed into maps and pointers.
//!
//! A [`Tracked`] value is owned by the caller and can be lent out as a
//! borrowed [`Pointer`] (or stored in a [`Map`](crate::Map) through
//! [`Map::update_borrowed`](crate::Map::update_borrowed)) without transferring
//! ownership. Each borrow holds a weak reference to the value plus a
//! [`Lease`] registered with the value's registry, so the owner can tell
//! whether it is still in use before letting go.
//!
//! ```rust
//! use genmap::{CheckMode, Tracked};
//!
//! let solver_state = Tracked::with_mode(vec![1.0_f64, 2.0], CheckMode::Checked);
//! let borrowed = solver_state.borrow();
//! assert_eq!(solver_state.borrow_count(), 1);
//!
//! drop(borrowed);
//! solver_state.release().unwrap();
//! ```
//!
//! Releasing (or dropping) a tracked value never leaves a dangling reference:
//! outstanding borrowed pointers fail with
//! [`PointerError::InvalidPointer`](crate::PointerError::InvalidPointer) once
//! the value is gone.

use std::{
    any::type_name,
    collections::BTreeSet,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{CheckMode, Pointer};

pub mod errors;

pub use errors::LifetimeError;

static NEXT_BORROW_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a single registered borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BorrowId(u64);

impl BorrowId {
    /// Allocates a process-wide unique id.
    pub fn next() -> Self {
        BorrowId(NEXT_BORROW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BorrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "borrow#{}", self.0)
    }
}

/// Set of outstanding borrows of one tracked value.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    borrows: Mutex<BTreeSet<BorrowId>>,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, BTreeSet<BorrowId>> {
        self.borrows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, id: BorrowId) -> bool {
        self.lock().insert(id)
    }

    fn unregister(&self, id: BorrowId) -> bool {
        self.lock().remove(&id)
    }

    fn count(&self) -> usize {
        self.lock().len()
    }
}

/// A registered borrow, unregistered when dropped.
///
/// Leases are only created in checked mode; unchecked borrows carry no lease.
#[derive(Debug)]
pub(crate) struct Lease {
    id: BorrowId,
    registry: Weak<Registry>,
}

impl Lease {
    fn acquire(registry: &Arc<Registry>) -> Self {
        let id = BorrowId::next();
        registry.register(id);
        Lease {
            id,
            registry: Arc::downgrade(registry),
        }
    }
}

impl Clone for Lease {
    fn clone(&self) -> Self {
        let id = BorrowId::next();
        if let Some(registry) = self.registry.upgrade() {
            registry.register(id);
        }
        Lease {
            id,
            registry: self.registry.clone(),
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}

/// A caller-owned value that can be lent out as borrowed pointers.
pub struct Tracked<T> {
    value: Arc<RwLock<T>>,
    registry: Arc<Registry>,
    mode: CheckMode,
    released: bool,
}

impl<T> Tracked<T> {
    /// Wraps `value` using the build's default [`CheckMode`].
    pub fn new(value: T) -> Self {
        Self::with_mode(value, CheckMode::default())
    }

    pub fn with_mode(value: T, mode: CheckMode) -> Self {
        Tracked {
            value: Arc::new(RwLock::new(value)),
            registry: Arc::new(Registry::default()),
            mode,
            released: false,
        }
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Registers an externally managed borrow.
    ///
    /// Returns `false` if `id` was already registered. A no-op returning `true`
    /// in unchecked mode.
    pub fn register_borrow(&self, id: BorrowId) -> bool {
        if !self.mode.is_checked() {
            return true;
        }
        self.registry.register(id)
    }

    /// Unregisters a borrow previously passed to [`Tracked::register_borrow`].
    ///
    /// Returns `false` if `id` was not registered. A no-op returning `true` in
    /// unchecked mode.
    pub fn unregister_borrow(&self, id: BorrowId) -> bool {
        if !self.mode.is_checked() {
            return true;
        }
        self.registry.unregister(id)
    }

    /// Number of outstanding borrows. Always 0 in unchecked mode.
    pub fn borrow_count(&self) -> usize {
        self.registry.count()
    }

    /// Lends the value out as a borrowed pointer.
    pub fn borrow(&self) -> Pointer<T> {
        let lease = self
            .mode
            .is_checked()
            .then(|| Lease::acquire(&self.registry));
        Pointer::borrowed(Arc::downgrade(&self.value), lease, self.mode)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.value.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gives up ownership of the value.
    ///
    /// In checked mode this fails with [`LifetimeError::StillInUse`] when
    /// borrows remain. The value is released in every case; the remaining
    /// borrowed pointers observe it as gone.
    pub fn release(mut self) -> Result<(), LifetimeError> {
        self.released = true;
        let borrows = self.borrow_count();
        if self.mode.is_checked() && borrows > 0 {
            return Err(LifetimeError::StillInUse {
                type_name: type_name::<T>().to_string(),
                borrows,
            });
        }
        Ok(())
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        if self.released || !self.mode.is_checked() {
            return;
        }
        let borrows = self.borrow_count();
        if borrows > 0 {
            tracing::error!(
                type_name = type_name::<T>(),
                borrows,
                "Tracked value dropped while still borrowed"
            );
        }
    }
}

impl<T> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("type_name", &type_name::<T>())
            .field("borrows", &self.borrow_count())
            .field("mode", &self.mode)
            .finish()
    }
}
