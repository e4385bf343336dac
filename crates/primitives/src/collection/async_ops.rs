//! Async operations shared by every policy
//!
//! Each call waits for the collection lock cooperatively and checks `cancel`
//! before waiting, once the lock is held, and between I/O steps. A cancelled
//! call leaves no structural change behind: an insert that already wrote its
//! data file deletes it before returning `Cancelled`.

use super::Collection;
use crate::policy::Policy;
use crate::snapshot::Snapshot;
use stowage_core::{EntryKey, Placement, Selector, StowageResult};
use stowage_storage::EventSink;
use tokio_util::sync::CancellationToken;

impl<T, P: Policy> Collection<T, P> {
    /// Async variant of [`insert_item`](Self::insert_item)
    pub async fn insert_item_async(
        &self,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        self.insert_placed_async(P::insert_placement(), item, cancel)
            .await
    }

    pub(crate) async fn insert_placed_async(
        &self,
        placement: Placement,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        let payload = self.encode(item)?;
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => {
                store
                    .insert_async(placement, &payload, cancel, &mut events)
                    .await
            }
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }

    /// Async variant of [`remove`](Self::remove)
    pub async fn remove_async(
        &self,
        selector: &Selector,
        cancel: &CancellationToken,
    ) -> StowageResult<T> {
        let codec = self.codec();
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store
                .remove_async(
                    selector,
                    |bytes| Ok(codec.decode(bytes)?),
                    cancel,
                    &mut events,
                )
                .await
                .map(|taken| taken.value),
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }

    /// Async variant of [`remove_at`](Self::remove_at)
    pub async fn remove_at_async(
        &self,
        index: usize,
        cancel: &CancellationToken,
    ) -> StowageResult<T> {
        self.remove_async(&Selector::Order(index), cancel).await
    }

    /// Async variant of [`remove_by_key`](Self::remove_by_key)
    pub async fn remove_by_key_async(
        &self,
        key: impl AsRef<str>,
        cancel: &CancellationToken,
    ) -> StowageResult<T> {
        let selector = Selector::Key(EntryKey::parse(key)?);
        self.remove_async(&selector, cancel).await
    }

    /// Async variant of [`peek_selector`](Self::peek_selector)
    pub async fn peek_selector_async(
        &self,
        selector: &Selector,
        cancel: &CancellationToken,
    ) -> StowageResult<T> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.peek_async(selector, cancel, &mut events).await,
            Err(e) => Err(e),
        };
        let entry = self.finish(events, result)?;
        self.decode(&entry.payload)
    }

    /// Async variant of [`peek_at`](Self::peek_at)
    pub async fn peek_at_async(&self, index: usize, cancel: &CancellationToken) -> StowageResult<T> {
        self.peek_selector_async(&Selector::Order(index), cancel)
            .await
    }

    /// Async variant of [`update_selector`](Self::update_selector)
    pub async fn update_selector_async(
        &self,
        selector: &Selector,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        let payload = self.encode(item)?;
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => {
                store
                    .update_async(selector, &payload, cancel, &mut events)
                    .await
            }
            Err(e) => Err(e),
        };
        self.finish(events, result).map(|(key, _)| key)
    }

    /// Async variant of [`update_at`](Self::update_at)
    pub async fn update_at_async(
        &self,
        index: usize,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        self.update_selector_async(&Selector::Order(index), item, cancel)
            .await
    }

    /// Async variant of [`update_by_key`](Self::update_by_key)
    pub async fn update_by_key_async(
        &self,
        key: impl AsRef<str>,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        let selector = Selector::Key(EntryKey::parse(key)?);
        self.update_selector_async(&selector, item, cancel).await
    }

    /// Async variant of [`count`](Self::count)
    pub async fn count_async(&self, cancel: &CancellationToken) -> StowageResult<usize> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.count_async(cancel, &mut events).await,
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }

    /// Async variant of [`total_bytes`](Self::total_bytes)
    pub async fn total_bytes_async(&self, cancel: &CancellationToken) -> StowageResult<u64> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.total_bytes_async(cancel, &mut events).await,
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }

    /// Async variant of [`get_keys`](Self::get_keys)
    pub async fn get_keys_async(&self, cancel: &CancellationToken) -> StowageResult<Vec<EntryKey>> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.keys_async(cancel, &mut events).await,
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }

    /// Async variant of [`snapshot`](Self::snapshot)
    pub async fn snapshot_async(&self, cancel: &CancellationToken) -> StowageResult<Snapshot<T>> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.snapshot_async(cancel, &mut events).await,
            Err(e) => Err(e),
        };
        let entries = self.finish(events, result)?;
        Ok(Snapshot::new(entries, self.codec().clone()))
    }

    /// Async variant of [`clear`](Self::clear)
    pub async fn clear_async(&self, cancel: &CancellationToken) -> StowageResult<usize> {
        let mut events = EventSink::new();
        let result = match self.lock_async(cancel).await {
            Ok(store) => store.clear_async(cancel, &mut events).await,
            Err(e) => Err(e),
        };
        self.finish(events, result)
    }
}
