//! In-memory remote store implementation for testing.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::store::{RemoteStore, ScanCursor, ScanPage};

/// An in-memory remote store backed by a HashMap.
///
/// Clones share the same data, so a test can keep a handle to a store that
/// a backend owns. Scans walk keys in hash order, not key order, and hand
/// out numeric offsets as cursors. A scan racing with writes may repeat or
/// miss keys.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: HashMap<String, Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
    fail_scan_at: Option<usize>,
    scan_calls: usize,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| Error::StoreUnavailable(e.to_string()))
    }

    /// Make every GET fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) -> Result<()> {
        self.lock()?.fail_reads = fail;
        Ok(())
    }

    /// Make every SET and DEL fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) -> Result<()> {
        self.lock()?.fail_writes = fail;
        Ok(())
    }

    /// Make the `page`-th scan call from now on fail (0 is the next call).
    pub fn fail_scan_at_page(&self, page: Option<usize>) -> Result<()> {
        let mut inner = self.lock()?;
        inner.fail_scan_at = page;
        inner.scan_calls = 0;
        Ok(())
    }

    /// All stored keys in ascending order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.data.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.data.is_empty())
    }
}

fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

fn scan_order(key: &str) -> u64 {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    h.finish()
}

impl RemoteStore for MemoryStore {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let inner = self.lock()?;
        if inner.fail_reads {
            return Err(Error::StoreUnavailable(format!("GET {}: injected failure", key)));
        }
        Ok(inner.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(Error::StoreUnavailable(format!("SET {}: injected failure", key)));
        }
        inner.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.fail_writes {
            return Err(Error::StoreUnavailable(format!("DEL {}: injected failure", key)));
        }
        inner.data.remove(key);
        Ok(())
    }

    fn scan_page(&mut self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        let mut inner = self.lock()?;
        let call = inner.scan_calls;
        inner.scan_calls += 1;
        if inner.fail_scan_at == Some(call) {
            return Err(Error::StoreUnavailable(format!("SCAN {}: injected failure", cursor)));
        }

        let offset: usize = cursor
            .as_str()
            .parse()
            .map_err(|_| Error::StoreUnavailable(format!("ERR invalid cursor {}", cursor)))?;

        let mut matching: Vec<&String> = inner
            .data
            .keys()
            .filter(|k| glob_match(pattern, k))
            .collect();
        matching.sort_by_cached_key(|k| (scan_order(k), *k));

        let end = offset.saturating_add(count.max(1)).min(matching.len());
        let keys = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|k| k.to_string())
            .collect();
        let next = if end >= matching.len() {
            ScanCursor::start()
        } else {
            ScanCursor::new(end.to_string())
        };
        Ok(ScanPage { cursor: next, keys })
    }
}
