//! Hierarchical, type-erased maps.
//!
//! A [`Map`] is a view onto a single ordered store of canonical keys to
//! [`Cell`]s. The store is shared (reference counted) by the root map and every
//! view derived from it with [`Map::submap`]; a view differs from its parent only
//! by its location, the key prefix every operation is resolved against.
//!
//! # Usage
//!
//! ```rust
//! use genmap::Map;
//!
//! let params = Map::new();
//! params.update("solver/tolerance", 1e-8_f64);
//! params.update("solver/max_iter", 200_u32);
//! params.update("mesh/name", String::from("square"));
//!
//! // Views share the store.
//! let solver = params.submap("solver");
//! assert_eq!(solver.get::<f64>("tolerance").unwrap(), 1e-8);
//! solver.update("max_iter", 500_u32);
//! assert_eq!(params.get::<u32>("solver/max_iter").unwrap(), 500);
//!
//! // `..` never leaves the view.
//! assert!(!solver.exists("../mesh/name"));
//!
//! // Missing keys can fall back to a default without inserting it.
//! assert_eq!(solver.get_or("restart", 30_u32).unwrap(), 30);
//! assert!(!solver.exists("restart"));
//! ```
//!
//! # Copy semantics
//!
//! [`Map::submap`] aliases; [`Clone`] does not. Cloning a root map copies the
//! whole key set into a new store. Cloning a view copies only the view's own
//! subtree into a new root map, rekeyed relative to the view (`/tree/i` seen
//! from `/tree` lands at `/i`), so the copy cannot reach the original's
//! sibling subtrees. In both cases the values themselves are shared
//! with the original: mutating a value in place through either map
//! ([`Map::with_mut`]) is visible in both, while [`Map::update`] on one only
//! replaces that map's cell.

use std::{
    any::Any,
    collections::BTreeMap,
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use handle_trait::Handle;
use tracing::{debug, trace};

use crate::{
    Cell, CheckMode, Pointer, Result, Tracked,
    cell::CellError,
    path::{Key, KeyBuf, is_descendant, resolve},
};

pub mod errors;
mod iter;

pub use errors::MapError;
pub use iter::{Entry, Iter};

use iter::{as_str_bounds, subtree_bounds};

type Entries = BTreeMap<String, Cell>;

/// Shared handle to the backing store of a map and its views.
#[derive(Clone, Default, Handle)]
pub(crate) struct Store {
    entries: Arc<RwLock<Entries>>,
}

impl Store {
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn ptr_eq(&self, other: &Store) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Clones, pointer-wise, every entry in the subtree rooted at `root`.
    fn collect_subtree(&self, root: &Key) -> Vec<(String, Cell)> {
        let bounds = subtree_bounds(root);
        self.read()
            .range::<str, _>(as_str_bounds(&bounds))
            .filter(|(key, _)| is_descendant(key, root))
            .map(|(key, cell)| (key.clone(), cell.clone()))
            .collect()
    }

    fn subtree_keys(&self, root: &Key) -> Vec<String> {
        let bounds = subtree_bounds(root);
        self.read()
            .range::<str, _>(as_str_bounds(&bounds))
            .map(|(key, _)| key)
            .filter(|key| is_descendant(key, root))
            .cloned()
            .collect()
    }
}

/// A hierarchical map of type-erased values, rooted at a location.
pub struct Map {
    store: Store,
    location: KeyBuf,
    mode: CheckMode,
}

impl Map {
    /// Creates an empty root map using the build's default [`CheckMode`].
    pub fn new() -> Self {
        Self::with_mode(CheckMode::default())
    }

    /// Creates an empty root map.
    pub fn with_mode(mode: CheckMode) -> Self {
        Map {
            store: Store::default(),
            location: KeyBuf::root(),
            mode,
        }
    }

    /// The key this view is rooted at.
    pub fn location(&self) -> &Key {
        &self.location
    }

    /// Returns `true` if this map is rooted at `/`.
    pub fn is_root(&self) -> bool {
        self.location.is_root()
    }

    pub fn mode(&self) -> CheckMode {
        self.mode
    }

    /// Resolves `key` against this view's location.
    pub fn resolve(&self, key: impl AsRef<str>) -> KeyBuf {
        resolve(&self.location, key.as_ref())
    }

    /// Returns `true` if both maps are views of the same store.
    pub fn shares_store_with(&self, other: &Map) -> bool {
        self.store.ptr_eq(&other.store)
    }

    /// Returns a view rooted at `key`, sharing this map's store.
    pub fn submap(&self, key: impl AsRef<str>) -> Map {
        Map {
            store: self.store.handle(),
            location: self.resolve(key),
            mode: self.mode,
        }
    }

    fn insert(&self, key: KeyBuf, cell: Cell) {
        trace!(
            key = %key,
            type_name = cell.type_name(),
            storage = ?cell.storage(),
            "Updating entry"
        );
        // Dropped after the lock is released.
        let _replaced = self.store.write().insert(key.into_string(), cell);
    }

    fn lookup(&self, key: &Key) -> Option<Cell> {
        self.store.read().get(key.as_str()).cloned()
    }

    fn require(&self, key: impl AsRef<str>) -> Result<Cell> {
        let key = self.resolve(key);
        self.lookup(&key).ok_or_else(|| {
            MapError::UnknownKey {
                key: key.into_string(),
            }
            .into()
        })
    }

    /// Inserts or replaces `key` with a value owned by the map.
    pub fn update<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) {
        self.insert(self.resolve(key), Cell::new(value, self.mode));
    }

    /// Inserts or replaces `key` with a value whose ownership the caller keeps
    /// a share of.
    pub fn update_shared<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: Arc<RwLock<T>>) {
        let pointer = Pointer::from_shared(value).with_mode(self.mode);
        self.insert(self.resolve(key), Cell::wrap_pointer(pointer));
    }

    /// Inserts or replaces `key` with a borrowed reference to `owner`'s value.
    ///
    /// The entry uses this map's mode; borrow registration follows `owner`'s.
    pub fn update_borrowed<T: Any + Send + Sync>(&self, key: impl AsRef<str>, owner: &Tracked<T>) {
        let pointer = owner.borrow().with_mode(self.mode);
        self.insert(self.resolve(key), Cell::wrap_pointer(pointer));
    }

    /// Inserts or replaces `key` with a shared or borrowed pointer.
    ///
    /// Fails with [`PointerError::InvalidPointer`](crate::PointerError::InvalidPointer)
    /// for an empty pointer.
    pub fn update_ptr<T: Any + Send + Sync>(
        &self,
        key: impl AsRef<str>,
        pointer: Pointer<T>,
    ) -> Result<()> {
        let cell = Cell::from_pointer(pointer)?;
        self.insert(self.resolve(key), cell);
        Ok(())
    }

    /// Inserts or replaces `key` with `cell`, sharing its value.
    pub fn update_cell(&self, key: impl AsRef<str>, cell: Cell) -> Result<()> {
        if cell.is_empty() {
            return Err(CellError::Empty.into());
        }
        self.insert(self.resolve(key), cell);
        Ok(())
    }

    /// Copies every entry of `other`'s view below `key`.
    ///
    /// An entry at `k` relative to `other`'s location lands at `key + k`
    /// relative to this map's location. Values are shared with `other`, not
    /// copied. `other` may be a view of this map's own store. Returns the number
    /// of entries copied.
    pub fn update_map(&self, key: impl AsRef<str>, other: &Map) -> usize {
        let target = self.resolve(key);
        let entries = other.store.collect_subtree(&other.location);
        let count = entries.len();

        let mut replaced = Vec::new();
        {
            let mut store = self.store.write();
            for (full_key, cell) in entries {
                let full_key = KeyBuf::from_canonical(full_key);
                let relative = full_key
                    .strip_prefix(&other.location)
                    .map(Key::as_str)
                    .unwrap_or_default();
                let dest = target.join(relative);
                replaced.extend(store.insert(dest.into_string(), cell));
            }
        }

        debug!(
            from = %other.location,
            to = %target,
            count,
            replaced = replaced.len(),
            "Copied map entries"
        );
        count
    }

    /// Copies every entry of `other`'s view into this map's location.
    pub fn merge(&self, other: &Map) -> usize {
        self.update_map("", other)
    }

    /// Returns a copy of the value at `key`.
    pub fn get<T: Any + Send + Sync + Clone>(&self, key: impl AsRef<str>) -> Result<T> {
        self.require(key)?.value()
    }

    /// Returns a copy of the value at `key`, or `default` if there is none.
    ///
    /// `default` is never inserted. A value of another type is still an error.
    pub fn get_or<T: Any + Send + Sync + Clone>(
        &self,
        key: impl AsRef<str>,
        default: T,
    ) -> Result<T> {
        match self.lookup(&self.resolve(key)) {
            Some(cell) => cell.value(),
            None => Ok(default),
        }
    }

    /// Calls `f` with a shared reference to the value at `key`.
    pub fn with<T: Any + Send + Sync, R>(
        &self,
        key: impl AsRef<str>,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R> {
        self.require(key)?.with(f)
    }

    /// Calls `f` with a mutable reference to the value at `key`.
    ///
    /// The change is made in place, so it is visible through every map sharing
    /// the value: views, copies and merged maps alike. `f` may use the map, but
    /// must not access the same value again.
    pub fn with_mut<T: Any + Send + Sync, R>(
        &self,
        key: impl AsRef<str>,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R> {
        self.require(key)?.with_mut(f)
    }

    /// Returns a pointer to the value at `key`.
    pub fn at_ptr<T: Any + Send + Sync>(&self, key: impl AsRef<str>) -> Result<Pointer<T>> {
        Ok(self.require(key)?.get::<T>()?.with_mode(self.mode))
    }

    /// Returns a pointer to the value at `key` without comparing types.
    ///
    /// # Safety
    /// The value at `key` must be a `T`.
    pub unsafe fn at_ptr_unchecked<T: Any + Send + Sync>(
        &self,
        key: impl AsRef<str>,
    ) -> Result<Pointer<T>> {
        let cell = self.require(key)?;
        // SAFETY: forwarded to the caller.
        let pointer = unsafe { cell.get_unchecked::<T>() }?;
        Ok(pointer.with_mode(self.mode))
    }

    /// Returns the cell at `key`, sharing its value.
    pub fn cell(&self, key: impl AsRef<str>) -> Option<Cell> {
        self.lookup(&self.resolve(key))
    }

    pub fn exists(&self, key: impl AsRef<str>) -> bool {
        let key = self.resolve(key);
        self.store.read().contains_key(key.as_str())
    }

    /// Name of the type stored at `key`.
    pub fn type_name(&self, key: impl AsRef<str>) -> Result<&'static str> {
        Ok(self.require(key)?.type_name())
    }

    /// Removes `key`. Returns the number of removed entries, 0 or 1.
    pub fn erase(&self, key: impl AsRef<str>) -> usize {
        let key = self.resolve(key);
        let removed = self.store.write().remove(key.as_str());
        trace!(key = %key, removed = removed.is_some(), "Erasing entry");
        usize::from(removed.is_some())
    }

    /// Removes `key` and every key below it. Returns the number of removed entries.
    pub fn erase_recursive(&self, key: impl AsRef<str>) -> usize {
        let root = self.resolve(key);
        let keys = self.store.subtree_keys(&root);
        let removed: Vec<Cell> = {
            let mut store = self.store.write();
            keys.iter().filter_map(|key| store.remove(key)).collect()
        };
        debug!(root = %root, count = removed.len(), "Erased subtree");
        removed.len()
    }

    /// Removes every key reachable from this view.
    ///
    /// On a root map this empties the store.
    pub fn clear(&self) -> usize {
        self.erase_recursive("")
    }

    /// Number of entries reachable from this view.
    pub fn len(&self) -> usize {
        self.store.subtree_keys(&self.location).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys reachable from this view, relative to its location, in order.
    pub fn keys(&self) -> Vec<KeyBuf> {
        self.iter().map(|entry| entry.key().to_key_buf()).collect()
    }

    /// Iterates over every entry reachable from this view.
    pub fn iter(&self) -> Iter {
        self.iter_at("")
    }

    /// Iterates over the subtree rooted at `key`.
    ///
    /// Entry keys are relative to the resolved `key`.
    pub fn iter_at(&self, key: impl AsRef<str>) -> Iter {
        Iter::new(self.store.handle(), self.resolve(key), self.mode)
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Map {
    fn clone(&self) -> Self {
        let copy = Map::with_mode(self.mode);
        if !self.is_root() {
            copy.merge(self);
            return copy;
        }

        let entries = self.store.collect_subtree(&self.location);
        debug!(count = entries.len(), "Copying map into a new store");
        copy.store.write().extend(entries);
        copy
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = Entry;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: AsRef<str>, V: Any + Send + Sync> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        map.extend(iter);
        map
    }
}

impl<K: AsRef<str>, V: Any + Send + Sync> Extend<(K, V)> for Map {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.update(key, value);
        }
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("location", &self.location)
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish()
    }
}

/// One `key: type` line per entry.
impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self {
            writeln!(f, "{}: {}", entry.key(), entry.type_name())?;
        }
        Ok(())
    }
}
