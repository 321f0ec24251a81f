//! Lazy ordered iteration over a backend.

use tracing::debug;

use crate::backend::Backend;
use crate::error::Result;
use crate::index::Position;
use crate::store::RemoteStore;

/// Ordered iterator returned by [`Backend::find`].
///
/// Each step reads the next key from the index, then fetches its value from
/// the store. Keys deleted between those two reads are skipped. Keys
/// inserted behind the current position are not revisited.
///
/// After an error the iterator is exhausted; resume with
/// [`Backend::find`] from [`position`](Iter::position). The position also
/// moves past skipped keys, so it can be ahead of the last key yielded.
pub struct Iter<'a, S> {
    backend: &'a Backend<S>,
    position: Position,
    done: bool,
}

impl<'a, S: RemoteStore> Iter<'a, S> {
    pub(crate) fn new(backend: &'a Backend<S>, start: &str) -> Self {
        Self {
            backend,
            position: Position::From(start.to_string()),
            done: false,
        }
    }

    fn next_key(&self) -> Option<String> {
        self.backend.index().next_at(&self.position)
    }

    /// Reports whether the index currently holds a key past the position.
    ///
    /// The answer may be stale by the time [`next`](Iterator::next) runs.
    pub fn has_next(&self) -> bool {
        !self.done && self.next_key().is_some()
    }

    /// The last key the iterator moved past, if any: either the last key
    /// yielded or a later key that was skipped because it had no value.
    pub fn position(&self) -> Option<&str> {
        match &self.position {
            Position::From(_) => None,
            Position::After(key) => Some(key),
        }
    }
}

impl<S: RemoteStore> Iterator for Iter<'_, S> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let Some(key) = self.next_key() else {
                self.done = true;
                return None;
            };
            match self.backend.get(&key) {
                Ok(Some(value)) => {
                    self.position = Position::After(key.clone());
                    return Some(Ok((key, value)));
                }
                Ok(None) => {
                    debug!(key = %key, "kvdb: skipping key deleted during iteration");
                    self.position = Position::After(key);
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<S> std::iter::FusedIterator for Iter<'_, S> where S: RemoteStore {}
