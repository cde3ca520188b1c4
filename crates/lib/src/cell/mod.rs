//! Type-erased value cells.
//!
//! A [`Cell`] holds exactly one value of an arbitrary `'static + Send + Sync`
//! type behind a uniform handle. Internally every value sits behind a
//! [`Pointer`], so a cell can store a value it allocated itself
//! ([`Storage::Copied`]), a value whose ownership the caller shares with it
//! ([`Storage::Shared`]), or a value borrowed from a
//! [`Tracked`](crate::Tracked) owner ([`Storage::Borrowed`]).
//!
//! Cloning a cell is pointer-wise: both cells refer to the same value.
//!
//! ```rust
//! use genmap::{Cell, CheckMode};
//!
//! let cell = Cell::new(2.5_f64, CheckMode::Checked);
//! assert_eq!(cell.type_name(), "f64");
//! assert_eq!(cell.value::<f64>().unwrap(), 2.5);
//! assert!(cell.value::<f32>().unwrap_err().is_type_error());
//! ```

use std::{
    any::{Any, TypeId, type_name},
    fmt,
};

use crate::{
    Result,
    config::{CheckMode, UNCHECKED_TYPE_NAME},
    pointer::{Pointer, PointerError},
};

pub mod errors;

pub use errors::CellError;

/// Placeholder type name of an empty cell.
pub const EMPTY_TYPE_NAME: &str = "<empty>";

/// How a cell holds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// The cell allocated the value from a moved-in or copied value.
    Copied,
    /// The caller shares ownership of the value with the cell.
    Shared,
    /// The value is owned elsewhere and borrowed by the cell.
    Borrowed,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Copied => write!(f, "copied"),
            Storage::Shared => write!(f, "shared"),
            Storage::Borrowed => write!(f, "borrowed"),
        }
    }
}

/// Object-safe view of a `Pointer<T>` with `T` erased.
trait ErasedPointer: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clone_boxed(&self) -> Box<dyn ErasedPointer>;
    fn value_type_id(&self) -> TypeId;
}

impl<T: Any + Send + Sync> ErasedPointer for Pointer<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedPointer> {
        Box::new(self.clone())
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

struct Slot {
    pointer: Box<dyn ErasedPointer>,
    /// Only recorded in checked mode.
    type_name: Option<&'static str>,
    storage: Storage,
}

impl Clone for Slot {
    fn clone(&self) -> Self {
        Slot {
            pointer: self.pointer.clone_boxed(),
            type_name: self.type_name,
            storage: self.storage,
        }
    }
}

/// A type-erased container for one value.
#[derive(Clone, Default)]
pub struct Cell {
    slot: Option<Slot>,
}

impl Cell {
    /// Creates a cell that holds nothing.
    pub fn empty() -> Self {
        Cell { slot: None }
    }

    /// Moves `value` into a freshly allocated cell.
    pub fn new<T: Any + Send + Sync>(value: T, mode: CheckMode) -> Self {
        Self::with_storage(Pointer::new(value).with_mode(mode), Storage::Copied)
    }

    /// Stores a shared or borrowed pointer.
    ///
    /// Fails with [`PointerError::InvalidPointer`] for an empty pointer.
    pub fn from_pointer<T: Any + Send + Sync>(
        pointer: Pointer<T>,
    ) -> std::result::Result<Self, PointerError> {
        if pointer.is_null() {
            return Err(PointerError::InvalidPointer {
                type_name: type_name::<T>().to_string(),
                reason: "cannot store an empty pointer".to_string(),
            });
        }
        Ok(Self::wrap_pointer(pointer))
    }

    /// Stores a pointer known to be non-null.
    pub(crate) fn wrap_pointer<T: Any + Send + Sync>(pointer: Pointer<T>) -> Self {
        let storage = if pointer.is_shared_ptr() {
            Storage::Shared
        } else {
            Storage::Borrowed
        };
        Self::with_storage(pointer, storage)
    }

    fn with_storage<T: Any + Send + Sync>(pointer: Pointer<T>, storage: Storage) -> Self {
        let type_name = pointer.mode().is_checked().then(type_name::<T>);
        Cell {
            slot: Some(Slot {
                pointer: Box::new(pointer),
                type_name,
                storage,
            }),
        }
    }

    /// Returns `true` if the cell was never initialized.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn storage(&self) -> Option<Storage> {
        self.slot.as_ref().map(|slot| slot.storage)
    }

    /// Name of the stored type.
    ///
    /// Returns `"<unchecked>"` when the cell was created in unchecked mode and
    /// `"<empty>"` for an empty cell.
    pub fn type_name(&self) -> &'static str {
        match &self.slot {
            None => EMPTY_TYPE_NAME,
            Some(slot) => slot.type_name.unwrap_or(UNCHECKED_TYPE_NAME),
        }
    }

    /// Identity of the stored type, `None` for an empty cell.
    pub fn value_type_id(&self) -> Option<TypeId> {
        self.slot.as_ref().map(|slot| slot.pointer.value_type_id())
    }

    /// Returns `true` if the cell holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value_type_id() == Some(TypeId::of::<T>())
    }

    fn slot(&self) -> std::result::Result<&Slot, CellError> {
        self.slot.as_ref().ok_or(CellError::Empty)
    }

    /// Returns a pointer to the stored value.
    ///
    /// Fails with [`CellError::WrongTypeRequested`] unless the cell holds a `T`.
    pub fn get<T: Any + Send + Sync>(&self) -> std::result::Result<Pointer<T>, CellError> {
        let slot = self.slot()?;
        slot.pointer
            .as_any()
            .downcast_ref::<Pointer<T>>()
            .cloned()
            .ok_or_else(|| CellError::WrongTypeRequested {
                expected: type_name::<T>().to_string(),
                actual: slot.type_name.unwrap_or(UNCHECKED_TYPE_NAME).to_string(),
            })
    }

    /// Returns a pointer to the stored value without comparing types.
    ///
    /// # Safety
    /// The cell must hold a `T`, as reported by [`Cell::is`].
    pub unsafe fn get_unchecked<T: Any + Send + Sync>(
        &self,
    ) -> std::result::Result<Pointer<T>, CellError> {
        let slot = self.slot()?;
        let any = slot.pointer.as_any();
        // SAFETY: the caller guarantees the erased pointer is a Pointer<T>.
        let pointer = unsafe { &*(any as *const dyn Any as *const Pointer<T>) };
        Ok(pointer.clone())
    }

    /// Calls `f` with a shared reference to the stored value.
    pub fn with<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        Ok(self.get::<T>()?.with(f)?)
    }

    /// Calls `f` with a mutable reference to the stored value.
    ///
    /// The change is visible through every cell sharing the value.
    pub fn with_mut<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        Ok(self.get::<T>()?.with_mut(f)?)
    }

    /// Returns a copy of the stored value.
    pub fn value<T: Any + Send + Sync + Clone>(&self) -> Result<T> {
        Ok(self.get::<T>()?.get()?)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("type_name", &self.type_name())
            .field("storage", &self.storage())
            .finish()
    }
}
