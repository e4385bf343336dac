//! Blocking operations shared by every policy

use super::Collection;
use crate::policy::Policy;
use crate::snapshot::Snapshot;
use stowage_core::{EntryKey, Placement, Selector, StowageResult};

impl<T, P: Policy> Collection<T, P> {
    // ========== Insertion ==========

    /// Insert `item` where the policy places new entries, returning its key.
    pub fn insert_item(&self, item: &T) -> StowageResult<EntryKey> {
        self.insert_placed(P::insert_placement(), item)
    }

    pub(crate) fn insert_placed(&self, placement: Placement, item: &T) -> StowageResult<EntryKey> {
        let payload = self.encode(item)?;
        self.with_store(|store, events| store.insert(placement, &payload, events))
    }

    // ========== Removal ==========

    /// Remove and return the item addressed by `selector`.
    ///
    /// # Errors
    ///
    /// - `EmptyCollection` for `Front`/`Back` on an empty collection
    /// - `IndexOutOfRange` for an order past the end
    /// - `NotFound` for an unknown key, or a key whose file has vanished
    /// - `Serialization` if the payload cannot be decoded; the entry is kept
    pub fn remove(&self, selector: &Selector) -> StowageResult<T> {
        let codec = self.codec();
        self.with_store(|store, events| {
            store
                .remove(selector, |bytes| Ok(codec.decode(bytes)?), events)
                .map(|taken| taken.value)
        })
    }

    /// Remove the item at position `index`; later items shift down by one.
    pub fn remove_at(&self, index: usize) -> StowageResult<T> {
        self.remove(&Selector::Order(index))
    }

    /// Remove the item stored under `key`.
    pub fn remove_by_key(&self, key: impl AsRef<str>) -> StowageResult<T> {
        self.remove(&Selector::Key(EntryKey::parse(key)?))
    }

    /// Remove every item, returning how many there were.
    pub fn clear(&self) -> StowageResult<usize> {
        self.with_store(|store, events| store.clear(events))
    }

    // ========== Reads ==========

    /// Read the item addressed by `selector` without removing it.
    pub fn peek_selector(&self, selector: &Selector) -> StowageResult<T> {
        let entry = self.with_store(|store, events| store.peek(selector, events))?;
        self.decode(&entry.payload)
    }

    /// Read the item at position `index`.
    pub fn peek_at(&self, index: usize) -> StowageResult<T> {
        self.peek_selector(&Selector::Order(index))
    }

    /// Read the item stored under `key`.
    pub fn peek_by_key(&self, key: impl AsRef<str>) -> StowageResult<T> {
        self.peek_selector(&Selector::Key(EntryKey::parse(key)?))
    }

    /// Number of entries
    pub fn count(&self) -> StowageResult<usize> {
        self.with_store(|store, events| store.count(events))
    }

    /// True if the collection holds no entries
    pub fn is_empty(&self) -> StowageResult<bool> {
        Ok(self.count()? == 0)
    }

    /// Sum of payload sizes in bytes
    pub fn total_bytes(&self) -> StowageResult<u64> {
        self.with_store(|store, events| store.total_bytes(events))
    }

    /// Keys in enumeration order
    pub fn get_keys(&self) -> StowageResult<Vec<EntryKey>> {
        self.with_store(|store, events| store.keys(events))
    }

    /// True if `key` names a live entry.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `key` is empty or not a valid key.
    pub fn contains_key(&self, key: impl AsRef<str>) -> StowageResult<bool> {
        let key = EntryKey::parse(key)?;
        self.with_store(|store, events| store.contains_key(&key, events))
    }

    /// True if `index` addresses an entry
    pub fn contains_index(&self, index: usize) -> StowageResult<bool> {
        Ok(index < self.count()?)
    }

    /// Point-in-time copy of every entry in enumeration order.
    pub fn snapshot(&self) -> StowageResult<Snapshot<T>> {
        let entries = self.with_store(|store, events| store.snapshot(events))?;
        Ok(Snapshot::new(entries, self.codec().clone()))
    }

    /// Alias of [`snapshot`](Self::snapshot)
    pub fn iter(&self) -> StowageResult<Snapshot<T>> {
        self.snapshot()
    }

    /// Decode every item in enumeration order.
    pub fn to_vec(&self) -> StowageResult<Vec<T>> {
        self.snapshot()?.to_vec()
    }

    // ========== Updates ==========

    /// Replace the item addressed by `selector`. Order and count are unchanged.
    pub fn update_selector(&self, selector: &Selector, item: &T) -> StowageResult<EntryKey> {
        let payload = self.encode(item)?;
        self.with_store(|store, events| store.update(selector, &payload, events))
            .map(|(key, _)| key)
    }

    /// Replace the item at position `index`.
    pub fn update_at(&self, index: usize, item: &T) -> StowageResult<EntryKey> {
        self.update_selector(&Selector::Order(index), item)
    }

    /// Replace the item stored under `key`.
    pub fn update_by_key(&self, key: impl AsRef<str>, item: &T) -> StowageResult<EntryKey> {
        self.update_selector(&Selector::Key(EntryKey::parse(key)?), item)
    }

    // ========== Maintenance ==========

    /// Delete data files that no index entry references.
    ///
    /// Each deleted file is reported as a `Fault::OrphanDataFile` event.
    pub fn sweep_orphans(&self) -> StowageResult<usize> {
        self.with_store(|store, events| store.sweep_orphans(events))
    }
}

impl<T: PartialEq, P: Policy> Collection<T, P> {
    /// True if any stored item equals `item`.
    pub fn contains(&self, item: &T) -> StowageResult<bool> {
        Ok(self.position_of(item)?.is_some())
    }

    /// Position of the first stored item equal to `item`
    pub(crate) fn position_of(&self, item: &T) -> StowageResult<Option<usize>> {
        let snapshot = self.snapshot()?;
        for (position, stored) in snapshot.iter().enumerate() {
            if stored? == *item {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }
}
