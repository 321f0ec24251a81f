//! The remote store interface.

use std::fmt;

use crate::error::Result;

/// Opaque pagination token for a key scan.
///
/// Cursors only drive pagination. They carry no ordering.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ScanCursor(String);

impl ScanCursor {
    /// The cursor that starts a scan.
    pub fn start() -> Self {
        Self("0".to_string())
    }

    /// Wrap a cursor token returned by the store.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, as sent back to the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ScanCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScanCursor({})", self.0)
    }
}

impl fmt::Display for ScanCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a key scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next page.
    pub cursor: ScanCursor,
    /// Namespaced keys found on this page, in no particular order.
    pub keys: Vec<String>,
}

/// A remote key-value store with exact-key access and cursor-paged scans.
///
/// Implementations own a single connection. Every method takes `&mut self`;
/// callers that share a store serialize access themselves.
///
/// Keys are passed through untouched: namespacing is the caller's concern.
pub trait RemoteStore: Send {
    /// Get the value stored under a key.
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store a value under a key, replacing any previous value.
    fn put(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a key. Deleting a missing key succeeds.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Fetch one page of keys matching a glob pattern.
    ///
    /// `count` is a hint; a page may hold more or fewer keys, including none.
    fn scan_page(&mut self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage>;

    /// Reports whether a cursor returned by [`scan_page`](Self::scan_page)
    /// ends the scan.
    fn is_complete(&self, cursor: &ScanCursor) -> bool {
        cursor.as_str() == "0"
    }
}

impl<S: RemoteStore + ?Sized> RemoteStore for Box<S> {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn scan_page(&mut self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        (**self).scan_page(cursor, pattern, count)
    }

    fn is_complete(&self, cursor: &ScanCursor) -> bool {
        (**self).is_complete(cursor)
    }
}

/// A boxed remote store for use in trait objects.
pub type BoxedRemoteStore = Box<dyn RemoteStore>;

impl fmt::Debug for dyn RemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemoteStore {{ ... }}")
    }
}
