//! PersistentQueue: first in, first out

use crate::collection::Collection;
use crate::policy::{Fifo, Policy};
use crate::stack::none_if_empty;
use stowage_core::{EntryKey, StowageResult};
use tokio_util::sync::CancellationToken;

/// Disk-backed FIFO queue
pub type PersistentQueue<T> = Collection<T, Fifo>;

impl<T> Collection<T, Fifo> {
    /// Append `item` at the back, returning its key.
    pub fn enqueue(&self, item: &T) -> StowageResult<EntryKey> {
        self.insert_item(item)
    }

    /// Remove and return the front item.
    ///
    /// # Errors
    ///
    /// `EmptyCollection` if the queue is empty.
    pub fn dequeue(&self) -> StowageResult<T> {
        self.remove(&Fifo::next())
    }

    /// Like [`dequeue`](Self::dequeue), but `None` when empty.
    pub fn try_dequeue(&self) -> StowageResult<Option<T>> {
        none_if_empty(self.dequeue())
    }

    /// Read the front item without removing it.
    pub fn peek(&self) -> StowageResult<T> {
        self.peek_selector(&Fifo::next())
    }

    /// Like [`peek`](Self::peek), but `None` when empty.
    pub fn try_peek(&self) -> StowageResult<Option<T>> {
        none_if_empty(self.peek())
    }

    /// Async variant of [`enqueue`](Self::enqueue)
    pub async fn enqueue_async(
        &self,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        self.insert_item_async(item, cancel).await
    }

    /// Async variant of [`dequeue`](Self::dequeue)
    pub async fn dequeue_async(&self, cancel: &CancellationToken) -> StowageResult<T> {
        self.remove_async(&Fifo::next(), cancel).await
    }

    /// Async variant of [`try_dequeue`](Self::try_dequeue)
    pub async fn try_dequeue_async(&self, cancel: &CancellationToken) -> StowageResult<Option<T>> {
        none_if_empty(self.dequeue_async(cancel).await)
    }

    /// Async variant of [`peek`](Self::peek)
    pub async fn peek_async(&self, cancel: &CancellationToken) -> StowageResult<T> {
        self.peek_selector_async(&Fifo::next(), cancel).await
    }
}
