//! PersistentList: random access by position
//!
//! `add` appends; `insert(i, item)` shifts items at `i..` up by one; the
//! `*_at` operations inherited from [`Collection`] address positions
//! directly. Positions are always `0..count`.

use crate::collection::Collection;
use crate::policy::Indexed;
use stowage_core::{EntryKey, Placement, Selector, StowageResult};
use tokio_util::sync::CancellationToken;

/// Disk-backed list with positional access
pub type PersistentList<T> = Collection<T, Indexed>;

impl<T> Collection<T, Indexed> {
    /// Append `item`, returning its key.
    pub fn add(&self, item: &T) -> StowageResult<EntryKey> {
        self.insert_item(item)
    }

    /// Insert `item` at position `index`. `index == count` appends.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index > count`; nothing is written.
    pub fn insert(&self, index: usize, item: &T) -> StowageResult<EntryKey> {
        self.insert_placed(Placement::At(index), item)
    }

    /// Item at position `index`
    pub fn get(&self, index: usize) -> StowageResult<T> {
        self.peek_at(index)
    }

    /// Replace the item at position `index`.
    pub fn set(&self, index: usize, item: &T) -> StowageResult<EntryKey> {
        self.update_at(index, item)
    }

    /// First item. `EmptyCollection` if the list is empty.
    pub fn first(&self) -> StowageResult<T> {
        self.peek_selector(&Selector::Front)
    }

    /// Last item. `EmptyCollection` if the list is empty.
    pub fn last(&self) -> StowageResult<T> {
        self.peek_selector(&Selector::Back)
    }

    /// Async variant of [`add`](Self::add)
    pub async fn add_async(&self, item: &T, cancel: &CancellationToken) -> StowageResult<EntryKey> {
        self.insert_item_async(item, cancel).await
    }

    /// Async variant of [`insert`](Self::insert)
    pub async fn insert_async(
        &self,
        index: usize,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        self.insert_placed_async(Placement::At(index), item, cancel)
            .await
    }

    /// Async variant of [`get`](Self::get)
    pub async fn get_async(&self, index: usize, cancel: &CancellationToken) -> StowageResult<T> {
        self.peek_at_async(index, cancel).await
    }

    /// Async variant of [`set`](Self::set)
    pub async fn set_async(
        &self,
        index: usize,
        item: &T,
        cancel: &CancellationToken,
    ) -> StowageResult<EntryKey> {
        self.update_at_async(index, item, cancel).await
    }
}

impl<T: PartialEq> Collection<T, Indexed> {
    /// Position of the first item equal to `item`
    pub fn index_of(&self, item: &T) -> StowageResult<Option<usize>> {
        self.position_of(item)
    }
}
