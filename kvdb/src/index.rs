//! Ordered in-memory index of known keys.

use std::collections::BTreeSet;
use std::ops::Bound;

use parking_lot::RwLock;

/// An ordered set of keys shared between writers and readers.
///
/// Reads take a shared lock; insert and remove take it exclusively. No
/// operation can fail.
#[derive(Debug, Default)]
pub struct KeyIndex {
    keys: RwLock<BTreeSet<String>>,
}

impl KeyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key. Inserting a present key does nothing.
    pub fn insert(&self, key: &str) {
        let mut keys = self.keys.write();
        if !keys.contains(key) {
            keys.insert(key.to_string());
        }
    }

    /// Remove a key. Removing an absent key does nothing.
    pub fn remove(&self, key: &str) {
        self.keys.write().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.read().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// The first key greater than or equal to `bound`.
    pub fn first_from(&self, bound: &str) -> Option<String> {
        self.first_in((Bound::Included(bound), Bound::Unbounded))
    }

    /// The first key strictly greater than `key`.
    pub fn first_after(&self, key: &str) -> Option<String> {
        self.first_in((Bound::Excluded(key), Bound::Unbounded))
    }

    fn first_in(&self, range: (Bound<&str>, Bound<&str>)) -> Option<String> {
        self.keys
            .read()
            .range::<str, _>(range)
            .next()
            .cloned()
    }

    /// The next key at a traversal position.
    pub(crate) fn next_at(&self, position: &Position) -> Option<String> {
        match position {
            Position::From(bound) => self.first_from(bound),
            Position::After(key) => self.first_after(key),
        }
    }

    /// Walk keys in ascending order starting at the first key >= `bound`.
    ///
    /// The walk is lazy and re-reads the index at every step, so it sees
    /// keys inserted ahead of it and skips keys removed ahead of it. The
    /// lock is never held between steps.
    pub fn ascend_from(&self, bound: &str) -> Ascend<'_> {
        Ascend {
            index: self,
            position: Some(Position::From(bound.to_string())),
        }
    }
}

/// A traversal position in a [`KeyIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Position {
    /// Start at the first key >= this bound.
    From(String),
    /// Resume strictly after this key.
    After(String),
}

/// Lazy ascending walk over a [`KeyIndex`].
#[derive(Debug)]
pub struct Ascend<'a> {
    index: &'a KeyIndex,
    position: Option<Position>,
}

impl Iterator for Ascend<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let key = self.index.next_at(&self.position.take()?)?;
        self.position = Some(Position::After(key.clone()));
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(keys: &[&str]) -> KeyIndex {
        let index = KeyIndex::new();
        for k in keys {
            index.insert(k);
        }
        index
    }

    #[test]
    fn test_insert_remove_idempotent() {
        let index = KeyIndex::new();
        index.insert("a");
        index.insert("a");
        assert_eq!(index.len(), 1);

        index.remove("a");
        index.remove("a");
        index.remove("never");
        assert!(index.is_empty());
    }

    #[test]
    fn test_ascend_from_bound() {
        let index = index_of(&["e", "a", "c"]);

        let all: Vec<String> = index.ascend_from("").collect();
        assert_eq!(all, vec!["a", "c", "e"]);

        let from_b: Vec<String> = index.ascend_from("b").collect();
        assert_eq!(from_b, vec!["c", "e"]);

        let from_c: Vec<String> = index.ascend_from("c").collect();
        assert_eq!(from_c, vec!["c", "e"]);

        assert_eq!(index.ascend_from("f").next(), None);
    }

    #[test]
    fn test_ascend_restartable() {
        let index = index_of(&["x", "y"]);
        let mut first = index.ascend_from("");
        assert_eq!(first.next().as_deref(), Some("x"));

        let second: Vec<String> = index.ascend_from("").collect();
        assert_eq!(second, vec!["x", "y"]);
        assert_eq!(first.next().as_deref(), Some("y"));
        assert_eq!(first.next(), None);
        assert_eq!(first.next(), None);
    }

    #[test]
    fn test_ascend_sees_concurrent_mutation() {
        let index = index_of(&["a", "c", "e"]);
        let mut walk = index.ascend_from("");
        assert_eq!(walk.next().as_deref(), Some("a"));

        index.insert("b");
        index.remove("c");
        index.insert("0"); // behind the walk, never seen

        assert_eq!(walk.next().as_deref(), Some("b"));
        assert_eq!(walk.next().as_deref(), Some("e"));
        assert_eq!(walk.next(), None);
    }

    #[test]
    fn test_first_from_and_after() {
        let index = index_of(&["k1", "k3"]);
        assert_eq!(index.first_from("k1").as_deref(), Some("k1"));
        assert_eq!(index.first_after("k1").as_deref(), Some("k3"));
        assert_eq!(index.first_from("k2").as_deref(), Some("k3"));
        assert_eq!(index.first_after("k3"), None);
        assert!(index.contains("k3"));
        assert!(!index.contains("k2"));
    }
}
