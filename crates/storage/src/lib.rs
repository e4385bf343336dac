//! Storage layer for stowage
//!
//! This crate implements the ordered persistent store shared by every
//! collection policy:
//! - StorageDirectory: one payload file per entry key, reserved index names
//! - IndexMap: `key -> order` engine (append, shift-insert, remove-renumber,
//!   heal, compact)
//! - IndexFile: atomic write-fsync-rename persistence of the index
//! - OrderedStore: the composition, with blocking and async operations
//!
//! The store itself takes no locks; the collection layer serializes access.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;
pub mod index;
pub mod index_file;
pub mod store;

pub use directory::{PendingFile, StorageDirectory, DEFAULT_INDEX_FILE_NAME};
pub use index::{reconcile, IndexMap, ParsedIndex, Reconciled};
pub use index_file::IndexFile;
pub use store::{raw_payload, EventSink, OrderedStore, StoreOptions, StoredEntry, Taken};
