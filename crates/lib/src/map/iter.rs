//! Iteration over the entries of a subtree.
//!
//! Because keys are kept in lexicographic order, the entries below a key `P`
//! sit in the range `[P, P + "0")` (`'0'` follows `'/'`). Keys such as
//! `P-x` also fall into that range without being descendants of `P`, so the
//! range is filtered component-wise.
//!
//! [`Iter`] does not hold a lock between steps. It remembers the last key
//! yielded at each end and re-queries the store, so the map can be modified
//! while iterating: removed entries are skipped and entries inserted inside the
//! remaining range are yielded.

use std::{any::Any, ops::Bound};

use super::Store;
use crate::{
    Cell, CheckMode, Pointer, Result,
    cell::Storage,
    path::{Key, KeyBuf, is_descendant},
};

/// Range bounds covering every key in the subtree rooted at `root`.
pub(crate) fn subtree_bounds(root: &Key) -> (Bound<String>, Bound<String>) {
    if root.is_root() {
        (Bound::Unbounded, Bound::Unbounded)
    } else {
        (
            Bound::Included(root.as_str().to_string()),
            Bound::Excluded(format!("{root}0")),
        )
    }
}

pub(crate) fn as_str_bounds(bounds: &(Bound<String>, Bound<String>)) -> (Bound<&str>, Bound<&str>) {
    (
        bounds.0.as_ref().map(String::as_str),
        bounds.1.as_ref().map(String::as_str),
    )
}

/// `BTreeMap::range` panics on inverted bounds; this tells whether a range is
/// safe to query.
fn bounds_ordered(bounds: &(Bound<String>, Bound<String>)) -> bool {
    match bounds {
        (Bound::Excluded(start), Bound::Excluded(end)) => start < end,
        (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) => {
            start <= end
        }
        _ => true,
    }
}

/// Double-ended iterator over the entries of a subtree, in key order.
pub struct Iter {
    store: Store,
    root: KeyBuf,
    bounds: (Bound<String>, Bound<String>),
    mode: CheckMode,
    finished: bool,
}

impl Iter {
    pub(crate) fn new(store: Store, root: KeyBuf, mode: CheckMode) -> Self {
        let bounds = subtree_bounds(&root);
        Iter {
            store,
            root,
            bounds,
            mode,
            finished: false,
        }
    }

    /// Key the iteration is rooted at.
    pub fn root(&self) -> &Key {
        &self.root
    }

    fn step(&mut self, forward: bool) -> Option<Entry> {
        if self.finished || !bounds_ordered(&self.bounds) {
            self.finished = true;
            return None;
        }

        let found = {
            let entries = self.store.read();
            let mut range = entries.range::<str, _>(as_str_bounds(&self.bounds));
            let root = &self.root;
            let hit = if forward {
                range.find(|(key, _)| is_descendant(key, root))
            } else {
                range.rev().find(|(key, _)| is_descendant(key, root))
            };
            hit.map(|(key, cell)| (key.clone(), cell.clone()))
        };

        let Some((key, cell)) = found else {
            self.finished = true;
            return None;
        };

        if forward {
            self.bounds.0 = Bound::Excluded(key.clone());
        } else {
            self.bounds.1 = Bound::Excluded(key.clone());
        }
        Some(Entry::new(KeyBuf::from_canonical(key), &self.root, cell, self.mode))
    }
}

impl Iterator for Iter {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(true)
    }
}

impl DoubleEndedIterator for Iter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.step(false)
    }
}

impl std::iter::FusedIterator for Iter {}

/// Accessor for one entry produced by [`Iter`].
///
/// Holds its own share of the cell, so it stays usable after the entry is
/// erased from the map.
#[derive(Debug, Clone)]
pub struct Entry {
    key: KeyBuf,
    full_key: KeyBuf,
    cell: Cell,
    mode: CheckMode,
}

impl Entry {
    fn new(full_key: KeyBuf, root: &Key, cell: Cell, mode: CheckMode) -> Self {
        let key = full_key
            .strip_prefix(root)
            .map(Key::to_key_buf)
            .unwrap_or_else(KeyBuf::root);
        Entry {
            key,
            full_key,
            cell,
            mode,
        }
    }

    /// Key relative to the iterated root, `/` for the root itself.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Absolute key in the backing store.
    pub fn full_key(&self) -> &Key {
        &self.full_key
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn type_name(&self) -> &'static str {
        self.cell.type_name()
    }

    pub fn storage(&self) -> Option<Storage> {
        self.cell.storage()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.cell.is::<T>()
    }

    /// Returns a copy of the value.
    pub fn get<T: Any + Send + Sync + Clone>(&self) -> Result<T> {
        self.cell.value()
    }

    pub fn with<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.cell.with(f)
    }

    pub fn with_mut<T: Any + Send + Sync, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.cell.with_mut(f)
    }

    /// Returns a pointer to the value.
    pub fn ptr<T: Any + Send + Sync>(&self) -> Result<Pointer<T>> {
        Ok(self.cell.get::<T>()?.with_mode(self.mode))
    }
}
