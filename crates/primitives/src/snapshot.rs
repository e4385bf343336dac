//! Point-in-time enumeration
//!
//! A `Snapshot` holds the keys and payload bytes copied out under the
//! collection lock. Items are decoded lazily while iterating, and the
//! snapshot can be iterated any number of times. Later mutations of the
//! collection are not visible through it.

use crate::codec::PayloadCodec;
use std::fmt;
use std::sync::Arc;
use stowage_core::{EntryKey, StowageResult};
use stowage_storage::StoredEntry;

/// Immutable, ordered copy of a collection's entries
pub struct Snapshot<T> {
    entries: Vec<StoredEntry>,
    codec: Arc<dyn PayloadCodec<T>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(entries: Vec<StoredEntry>, codec: Arc<dyn PayloadCodec<T>>) -> Self {
        Snapshot { entries, codec }
    }

    /// Number of entries captured
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the collection was empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in enumeration order
    pub fn keys(&self) -> impl Iterator<Item = &EntryKey> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Raw payload bytes in enumeration order
    pub fn payloads(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|e| e.payload.as_slice())
    }

    /// Decode the item at position `index`
    pub fn get(&self, index: usize) -> Option<StowageResult<T>> {
        self.entries.get(index).map(|e| self.decode(e))
    }

    /// Iterate decoded items in enumeration order
    pub fn iter(&self) -> SnapshotIter<'_, T> {
        SnapshotIter {
            snapshot: self,
            position: 0,
        }
    }

    /// Decode every item, failing on the first payload that does not decode
    pub fn to_vec(&self) -> StowageResult<Vec<T>> {
        self.iter().collect()
    }

    fn decode(&self, entry: &StoredEntry) -> StowageResult<T> {
        Ok(self.codec.decode(&entry.payload)?)
    }
}

impl<T> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.entries.len())
            .field("codec", &self.codec.codec_id())
            .finish()
    }
}

/// Iterator over a `Snapshot`
pub struct SnapshotIter<'a, T> {
    snapshot: &'a Snapshot<T>,
    position: usize,
}

impl<T> Iterator for SnapshotIter<'_, T> {
    type Item = StowageResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.snapshot.entries.get(self.position)?;
        self.position += 1;
        Some(self.snapshot.decode(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.snapshot.entries.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SnapshotIter<'_, T> {}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = StowageResult<T>;
    type IntoIter = SnapshotIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
