//! PersistentStack: last in, first out
//!
//! New entries take order 0 and every existing entry shifts up by one, so
//! the top of the stack is always order 0 and enumeration runs top to
//! bottom.

use crate::collection::Collection;
use crate::policy::{Lifo, Policy};
use stowage_core::{EntryKey, StowageError, StowageResult};
use tokio_util::sync::CancellationToken;

/// Disk-backed LIFO stack
pub type PersistentStack<T> = Collection<T, Lifo>;

impl<T> Collection<T, Lifo> {
    /// Push `item` on top, returning its key.
    pub fn push(&self, item: &T) -> StowageResult<EntryKey> {
        self.insert_item(item)
    }

    /// Remove and return the top item.
    ///
    /// # Errors
    ///
    /// `EmptyCollection` if the stack is empty.
    pub fn pop(&self) -> StowageResult<T> {
        self.remove(&Lifo::next())
    }

    /// Like [`pop`](Self::pop), but `None` when empty.
    pub fn try_pop(&self) -> StowageResult<Option<T>> {
        none_if_empty(self.pop())
    }

    /// Read the top item without removing it.
    pub fn peek(&self) -> StowageResult<T> {
        self.peek_selector(&Lifo::next())
    }

    /// Like [`peek`](Self::peek), but `None` when empty.
    pub fn try_peek(&self) -> StowageResult<Option<T>> {
        none_if_empty(self.peek())
    }

    /// Async variant of [`push`](Self::push)
    pub async fn push_async(&self, item: &T, cancel: &CancellationToken) -> StowageResult<EntryKey> {
        self.insert_item_async(item, cancel).await
    }

    /// Async variant of [`pop`](Self::pop)
    pub async fn pop_async(&self, cancel: &CancellationToken) -> StowageResult<T> {
        self.remove_async(&Lifo::next(), cancel).await
    }

    /// Async variant of [`try_pop`](Self::try_pop)
    pub async fn try_pop_async(&self, cancel: &CancellationToken) -> StowageResult<Option<T>> {
        none_if_empty(self.pop_async(cancel).await)
    }

    /// Async variant of [`peek`](Self::peek)
    pub async fn peek_async(&self, cancel: &CancellationToken) -> StowageResult<T> {
        self.peek_selector_async(&Lifo::next(), cancel).await
    }
}

/// Map `EmptyCollection` to `Ok(None)`
pub(crate) fn none_if_empty<T>(result: StowageResult<T>) -> StowageResult<Option<T>> {
    match result {
        Ok(item) => Ok(Some(item)),
        Err(StowageError::EmptyCollection) => Ok(None),
        Err(e) => Err(e),
    }
}
