//! Canonical keys and path resolution.
//!
//! Every entry of a [`Map`](crate::Map) lives under a canonical absolute key:
//! a `/`-separated string that starts with `/`, has no empty, `.` or `..`
//! components, and only ends with `/` when it is the root `/` itself.
//!
//! User-supplied keys are turned into canonical keys by [`resolve`], which
//! interprets them relative to a location the same way a shell interprets a
//! relative path relative to the working directory, except that `..` can never
//! climb above the location.
//!
//! The [`Key`]/[`KeyBuf`] types follow the borrowed/owned pattern of
//! `std::path::Path`/`PathBuf`.
//!
//! ```rust
//! use genmap::path::{KeyBuf, resolve};
//!
//! let tree = KeyBuf::normalize("tree");
//! assert_eq!(resolve(&tree, "a/./b//c").as_str(), "/tree/a/b/c");
//! assert_eq!(resolve(&tree, "../../..").as_str(), "/tree");
//! assert_eq!(resolve(&tree, "/").as_str(), "/tree");
//! ```

use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

/// Separator between key components.
pub const SEPARATOR: char = '/';

/// The root key.
pub const ROOT: &str = "/";

/// Resolves `key` relative to `location` and returns the canonical key.
///
/// Components of `key` are processed left to right on an initially empty stack:
/// empty components and `.` are ignored, `..` pops the last pushed component if
/// there is one, everything else is pushed. The result is `location` followed
/// by the stack. Components of `location` are never inspected, so the result
/// always starts with `location`.
pub fn resolve(location: &Key, key: &str) -> KeyBuf {
    let mut stack: Vec<&str> = Vec::new();
    for component in key.split(SEPARATOR) {
        match component {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    if stack.is_empty() {
        return location.to_key_buf();
    }

    let mut inner = String::with_capacity(
        location.inner.len() + stack.iter().map(|c| c.len() + 1).sum::<usize>(),
    );
    if !location.is_root() {
        inner.push_str(&location.inner);
    }
    for component in stack {
        inner.push(SEPARATOR);
        inner.push_str(component);
    }
    KeyBuf { inner }
}

/// Resolves `key` relative to the root.
pub fn normalize(key: &str) -> KeyBuf {
    resolve(Key::root(), key)
}

/// An owned canonical key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyBuf {
    inner: String,
}

/// A borrowed canonical key.
///
/// This type is unsized and must always be used behind a reference.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Key {
    inner: str,
}

impl KeyBuf {
    /// Creates the root key `/`.
    pub fn root() -> Self {
        Self {
            inner: ROOT.to_string(),
        }
    }

    /// Creates a canonical key by resolving `key` relative to the root.
    pub fn normalize(key: &str) -> Self {
        normalize(key)
    }

    /// Wraps a string that is already canonical.
    ///
    /// Only used for keys read back from a store, which only ever holds
    /// canonical keys.
    pub(crate) fn from_canonical(inner: String) -> Self {
        debug_assert!(is_canonical(&inner), "non-canonical key '{inner}'");
        Self { inner }
    }

    pub fn into_string(self) -> String {
        self.inner
    }
}

impl Key {
    /// The root key `/`.
    pub fn root() -> &'static Key {
        // SAFETY: "/" is canonical.
        unsafe { Key::from_str_unchecked(ROOT) }
    }

    /// Creates a key from a string without normalization.
    ///
    /// # Safety
    /// `s` must already be canonical. `Key` is `repr(transparent)` over `str`,
    /// so the cast itself is sound; the requirement protects the invariants the
    /// rest of the crate relies on.
    pub(crate) unsafe fn from_str_unchecked(s: &str) -> &Key {
        // SAFETY: Key has the same memory layout as str
        unsafe { &*(s as *const str as *const Key) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` for the root key `/`.
    pub fn is_root(&self) -> bool {
        &self.inner == ROOT
    }

    /// Returns an iterator over the components of the key.
    pub fn components(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.inner.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Returns the number of components, 0 for the root.
    pub fn len(&self) -> usize {
        self.components().count()
    }

    /// Returns `true` for the root, the only key without components.
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Returns the parent key, or `None` for the root.
    pub fn parent(&self) -> Option<&Key> {
        if self.is_root() {
            return None;
        }
        let last = self.inner.rfind(SEPARATOR)?;
        let parent = if last == 0 { ROOT } else { &self.inner[..last] };
        // SAFETY: a prefix of a canonical key that ends before a separator is canonical.
        Some(unsafe { Key::from_str_unchecked(parent) })
    }

    /// Returns the last component, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.components().next_back()
    }

    /// Resolves `key` relative to this key.
    pub fn join(&self, key: &str) -> KeyBuf {
        resolve(self, key)
    }

    /// Returns `true` if `ancestor` is this key or one of its ancestors.
    ///
    /// The comparison is component-wise: `/tree` is an ancestor of `/tree/i`
    /// but not of `/treehouse`.
    pub fn starts_with(&self, ancestor: &Key) -> bool {
        is_descendant(&self.inner, ancestor)
    }

    /// Returns this key relative to `ancestor`, as a canonical key.
    ///
    /// `ancestor` itself maps to `/`. Returns `None` if `ancestor` is not an
    /// ancestor of this key.
    pub fn strip_prefix(&self, ancestor: &Key) -> Option<&Key> {
        if ancestor.is_root() {
            return Some(self);
        }
        let rest = self.inner.strip_prefix(&ancestor.inner)?;
        let relative = match rest {
            "" => ROOT,
            rest if rest.starts_with(SEPARATOR) => rest,
            _ => return None,
        };
        // SAFETY: the remainder after a component boundary of a canonical key is canonical.
        Some(unsafe { Key::from_str_unchecked(relative) })
    }

    pub fn to_key_buf(&self) -> KeyBuf {
        KeyBuf {
            inner: self.inner.to_string(),
        }
    }
}

/// Component-wise ancestry check on a raw canonical key string.
pub(crate) fn is_descendant(key: &str, ancestor: &Key) -> bool {
    if ancestor.is_root() {
        return true;
    }
    match key.strip_prefix(&ancestor.inner) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Returns `true` if `s` is a canonical key.
pub fn is_canonical(s: &str) -> bool {
    if s == ROOT {
        return true;
    }
    s.starts_with(SEPARATOR)
        && s[1..]
            .split(SEPARATOR)
            .all(|c| !c.is_empty() && c != "." && c != "..")
}

impl Default for KeyBuf {
    fn default() -> Self {
        Self::root()
    }
}

impl Deref for KeyBuf {
    type Target = Key;

    fn deref(&self) -> &Self::Target {
        // SAFETY: KeyBuf only ever holds canonical keys.
        unsafe { Key::from_str_unchecked(self.inner.as_str()) }
    }
}

impl AsRef<Key> for KeyBuf {
    fn as_ref(&self) -> &Key {
        self
    }
}

impl AsRef<Key> for Key {
    fn as_ref(&self) -> &Key {
        self
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for KeyBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Key> for KeyBuf {
    fn borrow(&self) -> &Key {
        self
    }
}

impl ToOwned for Key {
    type Owned = KeyBuf;

    fn to_owned(&self) -> KeyBuf {
        self.to_key_buf()
    }
}

impl FromStr for KeyBuf {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<&str> for KeyBuf {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<KeyBuf> for String {
    fn from(key: KeyBuf) -> Self {
        key.inner
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl PartialEq<&str> for KeyBuf {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

impl fmt::Display for KeyBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.inner)
    }
}
