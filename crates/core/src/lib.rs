//! Core types for stowage
//!
//! This crate defines the foundational types shared by every layer:
//! - EntryKey: Opaque, collision-resistant identifier naming one data file
//! - Selector / Placement: How an operation addresses or places an entry
//! - StowageError: Error taxonomy (invalid argument, not found, empty, ...)
//! - CollectionEvent / Fault: Observer notifications fired after commit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod types;

pub use error::{ErrorKind, StowageError, StowageResult};
pub use event::{CollectionEvent, Fault};
pub use types::{EntryKey, Placement, Selector};
