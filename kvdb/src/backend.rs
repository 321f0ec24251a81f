//! Backend: a remote store plus the ordered index of its keys.

use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::index::{Ascend, KeyIndex};
use crate::iter::Iter;
use crate::store::{RemoteStore, ScanCursor};

/// Ordered key-value access over a [`RemoteStore`].
///
/// A `Backend` only exists once its index has been fully populated from a
/// complete scan of the store. All store commands go through one connection
/// under a mutex; the index has its own read-write lock.
pub struct Backend<S> {
    conn: Mutex<S>,
    index: KeyIndex,
    prefix: String,
}

impl<S: RemoteStore> Backend<S> {
    /// Take ownership of a store and build the key index from a full scan.
    ///
    /// Any failed page aborts the scan and the store is dropped. No backend
    /// with a partial index is ever returned.
    pub fn open(store: S, config: &Config) -> Result<Self> {
        config.validate()?;

        let backend = Self {
            conn: Mutex::new(store),
            index: KeyIndex::new(),
            prefix: config.prefix.clone(),
        };
        backend.initialize(&config.match_pattern(), config.scan_page_size)?;
        Ok(backend)
    }

    fn initialize(&self, pattern: &str, page_size: usize) -> Result<()> {
        info!(pattern, page_size, "kvdb: scanning keys");

        let mut conn = self.conn.lock();
        let mut cursor = ScanCursor::start();
        let mut pages = 0;
        loop {
            let page = conn
                .scan_page(&cursor, pattern, page_size)
                .map_err(|e| Error::ScanIncomplete {
                    pages,
                    source: Box::new(e),
                })?;
            pages += 1;
            debug!(keys = page.keys.len(), next_cursor = %page.cursor, "kvdb: scan page");

            for key in &page.keys {
                match key.strip_prefix(self.prefix.as_str()) {
                    Some(key) => self.index.insert(key),
                    None => warn!(key = %key, "kvdb: scan returned key outside namespace"),
                }
            }

            if conn.is_complete(&page.cursor) {
                break;
            }
            cursor = page.cursor;
        }

        info!(keys = self.index.len(), pages, "kvdb: key index ready");
        Ok(())
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Read a value from the store. The index is not consulted.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn.lock().get(&self.namespaced(key))
    }

    /// Write a value, then record the key in the index.
    ///
    /// If the store rejects the write the index is left untouched.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn.lock();
        conn.put(&self.namespaced(key), value)?;
        self.index.insert(key);
        debug!(key, len = value.len(), "kvdb: put");
        Ok(())
    }

    /// Delete a key from the store, then from the index.
    ///
    /// If the store rejects the delete the index is left untouched.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        conn.delete(&self.namespaced(key))?;
        self.index.remove(key);
        debug!(key, "kvdb: delete");
        Ok(())
    }

    /// Iterate entries in key order, starting at the first key >= `key`.
    ///
    /// An empty key starts from the beginning.
    pub fn find(&self, key: &str) -> Iter<'_, S> {
        Iter::new(self, key)
    }

    /// Walk indexed keys in order from the first key >= `key`, without
    /// touching the store.
    pub fn keys_from(&self, key: &str) -> Ascend<'_> {
        self.index.ascend_from(key)
    }

    /// Namespace prefix of managed keys.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of keys currently in the index.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn index(&self) -> &KeyIndex {
        &self.index
    }

    /// Shut the backend down and hand back its store.
    pub fn close(self) -> S {
        info!(keys = self.index.len(), "kvdb: closed");
        self.conn.into_inner()
    }
}

impl<S> fmt::Debug for Backend<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("prefix", &self.prefix)
            .field("keys", &self.index.len())
            .finish_non_exhaustive()
    }
}
