//! OrderedStore: data files + index composed into one ordered entry store
//!
//! Every operation follows the same shape:
//!
//! 1. Load the index, list the directory, heal and compact (persisting the
//!    repaired index if anything was dropped)
//! 2. Resolve the placement or selector against the healed map
//! 3. Touch the data file and rewrite the index in crash-safe order
//!
//! Crash ordering:
//! - insert writes the data file first, then the index; a failure in between
//!   deletes the new file again
//! - remove rewrites the index first, then deletes the data file; a failure
//!   in between leaves an orphan file, never a dangling index entry
//!
//! The store is not synchronized. Callers serialize access (the collection
//! layer holds an exclusive lock around every call). Events produced while
//! the caller holds that lock are pushed into the supplied `EventSink` and
//! must be delivered after it is released.
//!
//! Two stores opened on the same directory do not coordinate with each
//! other; concurrent use from separate instances or processes is unsafe.

use crate::directory::{StorageDirectory, DEFAULT_INDEX_FILE_NAME};
use crate::index::{reconcile, IndexMap};
use crate::index_file::IndexFile;
use std::collections::BTreeSet;
use std::path::Path;
use stowage_core::{
    CollectionEvent, EntryKey, Fault, Placement, Selector, StowageError, StowageResult,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Buffer of events produced inside the critical section
pub type EventSink = Vec<CollectionEvent>;

/// Options for opening an `OrderedStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Name of the reserved index file
    pub index_file_name: String,
    /// fsync data files, the index, and the directory on every write
    pub sync_writes: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            index_file_name: DEFAULT_INDEX_FILE_NAME.to_string(),
            sync_writes: false,
        }
    }
}

/// One entry read out of the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Entry key
    pub key: EntryKey,
    /// Order at the time of the read
    pub order: usize,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// Entry removed from the store, with its decoded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taken<R> {
    /// Key the entry had
    pub key: EntryKey,
    /// Order the entry had before removal
    pub order: usize,
    /// Decoded payload
    pub value: R,
}

/// Decoder for [`OrderedStore::remove`] that keeps the raw bytes
pub fn raw_payload(bytes: &[u8]) -> StowageResult<Vec<u8>> {
    Ok(bytes.to_vec())
}

/// Directory-backed ordered store
#[derive(Debug)]
pub struct OrderedStore {
    dir: StorageDirectory,
    index: IndexFile,
}

fn ensure_active(cancel: &CancellationToken) -> StowageResult<()> {
    if cancel.is_cancelled() {
        Err(StowageError::Cancelled)
    } else {
        Ok(())
    }
}

/// Order a placement resolves to in `map`
fn placement_order(map: &IndexMap, placement: Placement) -> StowageResult<usize> {
    match placement {
        Placement::Front => Ok(0),
        Placement::Append => Ok(map.allocate_append_order()),
        Placement::At(index) if index <= map.len() => Ok(index),
        Placement::At(index) => Err(StowageError::IndexOutOfRange {
            index,
            count: map.len(),
        }),
    }
}

/// Key and order a selector addresses in `map`
fn resolve(map: &IndexMap, selector: &Selector) -> StowageResult<(EntryKey, usize)> {
    match selector {
        Selector::Front => map
            .front()
            .map(|(k, o)| (k.clone(), o))
            .ok_or(StowageError::EmptyCollection),
        Selector::Back => map
            .back()
            .map(|(k, o)| (k.clone(), o))
            .ok_or(StowageError::EmptyCollection),
        Selector::Key(key) => map
            .order_of(key.as_str())
            .map(|o| (key.clone(), o))
            .ok_or_else(|| StowageError::not_found(format!("key {}", key))),
        Selector::Order(order) => map
            .key_at(*order)
            .map(|k| (k.clone(), *order))
            .ok_or(StowageError::IndexOutOfRange {
                index: *order,
                count: map.len(),
            }),
    }
}

fn report_faults(faults: Vec<Fault>, events: &mut EventSink) {
    for fault in faults {
        warn!(
            target: "stowage::store",
            key = ?fault.key().map(EntryKey::as_str),
            fault = %fault,
            "Healed index inconsistency"
        );
        events.push(CollectionEvent::Fault(fault));
    }
}

fn missing_file_fault(key: &EntryKey, order: usize) -> Fault {
    Fault::MissingDataFile {
        key: key.clone(),
        order,
    }
}

impl OrderedStore {
    /// Bind to `root` (created if absent) and make sure the index file exists.
    pub fn open(root: impl AsRef<Path>, options: &StoreOptions) -> StowageResult<Self> {
        let dir = StorageDirectory::open(root, &options.index_file_name, options.sync_writes)?;
        let index = IndexFile::new(dir.index_path(), dir.index_temp_path(), options.sync_writes);
        index.ensure_exists()?;

        info!(
            target: "stowage::store",
            path = ?dir.root(),
            index = %options.index_file_name,
            "Opened ordered store"
        );
        Ok(OrderedStore { dir, index })
    }

    /// Storage directory backing this store
    pub fn directory(&self) -> &StorageDirectory {
        &self.dir
    }

    /// Root path of the store
    pub fn root(&self) -> &Path {
        self.dir.root()
    }

    // ========================================================================
    // Blocking operations
    // ========================================================================

    /// Load, heal, and compact the index.
    pub fn load(&self, events: &mut EventSink) -> StowageResult<IndexMap> {
        let parsed = self.index.load()?;
        let present = self.dir.enumerate_files()?;
        let reconciled = reconcile(parsed, &present);
        if reconciled.needs_persist {
            self.index.persist(&reconciled.map)?;
        }
        report_faults(reconciled.faults, events);
        Ok(reconciled.map)
    }

    /// Insert a payload at `placement`, returning its new key.
    pub fn insert(
        &self,
        placement: Placement,
        payload: &[u8],
        events: &mut EventSink,
    ) -> StowageResult<EntryKey> {
        let mut map = self.load(events)?;
        let order = placement_order(&map, placement)?;
        let key = EntryKey::generate();

        let pending = self.dir.write_new(&key, payload)?;
        map.shift_and_insert(key.clone(), order)?;
        // Dropping `pending` on failure removes the data file again
        self.index.persist(&map)?;
        pending.commit();

        debug!(target: "stowage::store", key = %key, order, count = map.len(), "Inserted entry");
        events.push(CollectionEvent::Added {
            key: key.clone(),
            order,
        });
        Ok(key)
    }

    /// Read the entry addressed by `selector` without removing it.
    pub fn peek(&self, selector: &Selector, events: &mut EventSink) -> StowageResult<StoredEntry> {
        let mut map = self.load(events)?;
        let (key, order) = resolve(&map, selector)?;
        let payload = self.read_or_heal(&mut map, &key, order, events)?;
        Ok(StoredEntry {
            key,
            order,
            payload,
        })
    }

    /// Remove the entry addressed by `selector`.
    ///
    /// `decode` runs on the payload before anything is committed; if it
    /// fails the entry stays in place and the error is returned.
    pub fn remove<R, F>(
        &self,
        selector: &Selector,
        decode: F,
        events: &mut EventSink,
    ) -> StowageResult<Taken<R>>
    where
        F: FnOnce(&[u8]) -> StowageResult<R>,
    {
        let mut map = self.load(events)?;
        let (key, order) = resolve(&map, selector)?;
        let payload = self.read_or_heal(&mut map, &key, order, events)?;
        let value = decode(&payload)?;

        map.remove_and_renumber(order);
        self.index.persist(&map)?;
        self.delete_after_commit(&key);

        debug!(target: "stowage::store", key = %key, order, count = map.len(), "Removed entry");
        events.push(CollectionEvent::Removed {
            key: key.clone(),
            order,
        });
        Ok(Taken { key, order, value })
    }

    /// Replace the payload of the entry addressed by `selector`.
    ///
    /// Order and count are untouched. If the write fails the previous bytes
    /// are restored on a best-effort basis.
    pub fn update(
        &self,
        selector: &Selector,
        payload: &[u8],
        events: &mut EventSink,
    ) -> StowageResult<(EntryKey, usize)> {
        let mut map = self.load(events)?;
        let (key, order) = resolve(&map, selector)?;
        let previous = self.read_or_heal(&mut map, &key, order, events)?;

        if let Err(e) = self.dir.overwrite(&key, payload) {
            if let Err(restore) = self.dir.overwrite(&key, &previous) {
                error!(
                    target: "stowage::store",
                    key = %key,
                    error = %restore,
                    "Failed to restore payload after failed update"
                );
            }
            return Err(e);
        }

        debug!(target: "stowage::store", key = %key, order, "Updated entry");
        events.push(CollectionEvent::Updated {
            key: key.clone(),
            order,
        });
        Ok((key, order))
    }

    /// Number of entries
    pub fn count(&self, events: &mut EventSink) -> StowageResult<usize> {
        Ok(self.load(events)?.len())
    }

    /// Keys in ascending order
    pub fn keys(&self, events: &mut EventSink) -> StowageResult<Vec<EntryKey>> {
        Ok(self.load(events)?.ordered_keys())
    }

    /// True if `key` is indexed and backed by a file
    pub fn contains_key(&self, key: &EntryKey, events: &mut EventSink) -> StowageResult<bool> {
        Ok(self.load(events)?.contains_key(key.as_str()))
    }

    /// Sum of payload sizes in bytes
    pub fn total_bytes(&self, events: &mut EventSink) -> StowageResult<u64> {
        let map = self.load(events)?;
        let mut total = 0u64;
        for (key, _) in map.iter() {
            match self.dir.size(key) {
                Ok(size) => total += size,
                // Vanished since the load; the next load heals it
                Err(StowageError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Point-in-time copy of every entry in ascending order.
    pub fn snapshot(&self, events: &mut EventSink) -> StowageResult<Vec<StoredEntry>> {
        let mut map = self.load(events)?;
        let mut entries = Vec::with_capacity(map.len());
        let mut vanished = Vec::new();

        for key in map.ordered_keys() {
            match self.dir.read(&key) {
                Ok(payload) => entries.push((key, payload)),
                Err(StowageError::NotFound(_)) => vanished.push(key),
                Err(e) => return Err(e),
            }
        }

        if !vanished.is_empty() {
            let mut faults = Vec::with_capacity(vanished.len());
            for key in vanished {
                if let Some(order) = map.remove_key(key.as_str()) {
                    faults.push(missing_file_fault(&key, order));
                }
            }
            self.index.persist(&map)?;
            report_faults(faults, events);
        }

        Ok(number_entries(entries))
    }

    /// Remove every entry. Returns how many were present.
    pub fn clear(&self, events: &mut EventSink) -> StowageResult<usize> {
        let map = self.load(events)?;
        let removed = map.len();

        self.index.persist(&IndexMap::new())?;
        for (key, _) in map.iter() {
            self.delete_after_commit(key);
        }
        self.dir.sync_dir()?;

        info!(target: "stowage::store", removed, "Cleared store");
        events.push(CollectionEvent::Cleared { removed });
        Ok(removed)
    }

    /// Delete data files that no index line references.
    pub fn sweep_orphans(&self, events: &mut EventSink) -> StowageResult<usize> {
        let map = self.load(events)?;
        let present = self.dir.enumerate_files()?;

        let mut faults = Vec::new();
        for name in orphan_names(&map, &present) {
            if self.dir.delete_name(&name)? {
                faults.push(Fault::OrphanDataFile { name });
            }
        }
        let swept = faults.len();
        report_faults(faults, events);
        Ok(swept)
    }

    /// Delete the whole directory subtree.
    pub fn destroy(&self) -> StowageResult<()> {
        self.dir.remove_all()?;
        info!(target: "stowage::store", path = ?self.dir.root(), "Removed store directory");
        Ok(())
    }

    fn read_or_heal(
        &self,
        map: &mut IndexMap,
        key: &EntryKey,
        order: usize,
        events: &mut EventSink,
    ) -> StowageResult<Vec<u8>> {
        match self.dir.read(key) {
            Err(StowageError::NotFound(what)) => {
                map.remove_and_renumber(order);
                self.index.persist(map)?;
                report_faults(vec![missing_file_fault(key, order)], events);
                Err(StowageError::NotFound(what))
            }
            other => other,
        }
    }

    fn delete_after_commit(&self, key: &EntryKey) {
        // The index no longer references the key; a failure only leaves an orphan
        if let Err(e) = self.dir.delete(key) {
            error!(
                target: "stowage::store",
                key = %key,
                error = %e,
                "Failed to delete data file after index commit; file is now an orphan"
            );
        }
    }

    // ========================================================================
    // Async operations
    // ========================================================================

    /// Async variant of [`load`](Self::load)
    pub async fn load_async(&self, events: &mut EventSink) -> StowageResult<IndexMap> {
        let parsed = self.index.load_async().await?;
        let present = self.dir.enumerate_files_async().await?;
        let reconciled = reconcile(parsed, &present);
        if reconciled.needs_persist {
            self.index.persist_async(&reconciled.map).await?;
        }
        report_faults(reconciled.faults, events);
        Ok(reconciled.map)
    }

    /// Async variant of [`insert`](Self::insert).
    ///
    /// Cancellation is checked on entry, after the payload is written, and
    /// never after the index rewrite has started. A cancelled insert deletes
    /// its data file and leaves the index untouched.
    pub async fn insert_async(
        &self,
        placement: Placement,
        payload: &[u8],
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<EntryKey> {
        ensure_active(cancel)?;
        let mut map = self.load_async(events).await?;
        let order = placement_order(&map, placement)?;
        let key = EntryKey::generate();

        let pending = self.dir.write_new_async(&key, payload).await?;
        if cancel.is_cancelled() {
            debug!(target: "stowage::store", key = %key, "Insert cancelled; rolling back data file");
            drop(pending);
            return Err(StowageError::Cancelled);
        }
        map.shift_and_insert(key.clone(), order)?;
        self.index.persist_async(&map).await?;
        pending.commit();

        debug!(target: "stowage::store", key = %key, order, count = map.len(), "Inserted entry");
        events.push(CollectionEvent::Added {
            key: key.clone(),
            order,
        });
        Ok(key)
    }

    /// Async variant of [`peek`](Self::peek)
    pub async fn peek_async(
        &self,
        selector: &Selector,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<StoredEntry> {
        ensure_active(cancel)?;
        let mut map = self.load_async(events).await?;
        let (key, order) = resolve(&map, selector)?;
        let payload = self.read_or_heal_async(&mut map, &key, order, events).await?;
        Ok(StoredEntry {
            key,
            order,
            payload,
        })
    }

    /// Async variant of [`remove`](Self::remove)
    pub async fn remove_async<R, F>(
        &self,
        selector: &Selector,
        decode: F,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<Taken<R>>
    where
        F: FnOnce(&[u8]) -> StowageResult<R>,
    {
        ensure_active(cancel)?;
        let mut map = self.load_async(events).await?;
        let (key, order) = resolve(&map, selector)?;
        let payload = self.read_or_heal_async(&mut map, &key, order, events).await?;
        let value = decode(&payload)?;
        ensure_active(cancel)?;

        map.remove_and_renumber(order);
        self.index.persist_async(&map).await?;
        self.delete_after_commit_async(&key).await;

        debug!(target: "stowage::store", key = %key, order, count = map.len(), "Removed entry");
        events.push(CollectionEvent::Removed {
            key: key.clone(),
            order,
        });
        Ok(Taken { key, order, value })
    }

    /// Async variant of [`update`](Self::update)
    pub async fn update_async(
        &self,
        selector: &Selector,
        payload: &[u8],
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<(EntryKey, usize)> {
        ensure_active(cancel)?;
        let mut map = self.load_async(events).await?;
        let (key, order) = resolve(&map, selector)?;
        let previous = self.read_or_heal_async(&mut map, &key, order, events).await?;
        ensure_active(cancel)?;

        if let Err(e) = self.dir.overwrite_async(&key, payload).await {
            if let Err(restore) = self.dir.overwrite_async(&key, &previous).await {
                error!(
                    target: "stowage::store",
                    key = %key,
                    error = %restore,
                    "Failed to restore payload after failed update"
                );
            }
            return Err(e);
        }

        debug!(target: "stowage::store", key = %key, order, "Updated entry");
        events.push(CollectionEvent::Updated {
            key: key.clone(),
            order,
        });
        Ok((key, order))
    }

    /// Async variant of [`count`](Self::count)
    pub async fn count_async(
        &self,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<usize> {
        ensure_active(cancel)?;
        Ok(self.load_async(events).await?.len())
    }

    /// Async variant of [`total_bytes`](Self::total_bytes)
    pub async fn total_bytes_async(
        &self,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<u64> {
        ensure_active(cancel)?;
        let map = self.load_async(events).await?;
        let mut total = 0u64;
        for key in map.ordered_keys() {
            ensure_active(cancel)?;
            match self.dir.size_async(&key).await {
                Ok(size) => total += size,
                Err(StowageError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    /// Async variant of [`keys`](Self::keys)
    pub async fn keys_async(
        &self,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<Vec<EntryKey>> {
        ensure_active(cancel)?;
        Ok(self.load_async(events).await?.ordered_keys())
    }

    /// Async variant of [`snapshot`](Self::snapshot)
    pub async fn snapshot_async(
        &self,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<Vec<StoredEntry>> {
        ensure_active(cancel)?;
        let mut map = self.load_async(events).await?;
        let mut entries = Vec::with_capacity(map.len());
        let mut vanished = Vec::new();

        for key in map.ordered_keys() {
            ensure_active(cancel)?;
            match self.dir.read_async(&key).await {
                Ok(payload) => entries.push((key, payload)),
                Err(StowageError::NotFound(_)) => vanished.push(key),
                Err(e) => return Err(e),
            }
        }

        if !vanished.is_empty() {
            let mut faults = Vec::with_capacity(vanished.len());
            for key in vanished {
                if let Some(order) = map.remove_key(key.as_str()) {
                    faults.push(missing_file_fault(&key, order));
                }
            }
            self.index.persist_async(&map).await?;
            report_faults(faults, events);
        }

        Ok(number_entries(entries))
    }

    /// Async variant of [`clear`](Self::clear)
    pub async fn clear_async(
        &self,
        cancel: &CancellationToken,
        events: &mut EventSink,
    ) -> StowageResult<usize> {
        ensure_active(cancel)?;
        let map = self.load_async(events).await?;
        let removed = map.len();
        ensure_active(cancel)?;

        self.index.persist_async(&IndexMap::new()).await?;
        for (key, _) in map.iter() {
            self.delete_after_commit_async(key).await;
        }
        self.dir.sync_dir_async().await?;

        info!(target: "stowage::store", removed, "Cleared store");
        events.push(CollectionEvent::Cleared { removed });
        Ok(removed)
    }

    async fn read_or_heal_async(
        &self,
        map: &mut IndexMap,
        key: &EntryKey,
        order: usize,
        events: &mut EventSink,
    ) -> StowageResult<Vec<u8>> {
        match self.dir.read_async(key).await {
            Err(StowageError::NotFound(what)) => {
                map.remove_and_renumber(order);
                self.index.persist_async(map).await?;
                report_faults(vec![missing_file_fault(key, order)], events);
                Err(StowageError::NotFound(what))
            }
            other => other,
        }
    }

    async fn delete_after_commit_async(&self, key: &EntryKey) {
        if let Err(e) = self.dir.delete_async(key).await {
            error!(
                target: "stowage::store",
                key = %key,
                error = %e,
                "Failed to delete data file after index commit; file is now an orphan"
            );
        }
    }
}

/// Assign positions to a snapshot that may have lost entries while reading
fn number_entries(entries: Vec<(EntryKey, Vec<u8>)>) -> Vec<StoredEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(order, (key, payload))| StoredEntry {
            key,
            order,
            payload,
        })
        .collect()
}

/// Names present on disk but absent from `map`
pub fn orphan_names(map: &IndexMap, present: &BTreeSet<String>) -> Vec<String> {
    present
        .iter()
        .filter(|name| !map.contains_key(name))
        .cloned()
        .collect()
}
