//! Observer notifications
//!
//! Events are collected while an operation holds the collection lock and
//! delivered after the lock is released. Faults describe inconsistencies the
//! store found and repaired on its own; they are never raised as errors.

use crate::types::EntryKey;
use std::fmt;

/// A detected and self-healed inconsistency between the index and the data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Index line that does not split into `<key> <order>` with a valid key
    /// and a non-negative integer order. The line was dropped.
    MalformedIndexLine {
        /// 1-based line number in the index file
        line_number: usize,
        /// Raw line content
        line: String,
    },
    /// The same key appeared on more than one index line. The first line wins.
    DuplicateKey {
        /// Repeated key
        key: EntryKey,
        /// 1-based line number of the ignored repeat
        line_number: usize,
    },
    /// Index references a key whose data file is gone. The key was dropped.
    MissingDataFile {
        /// Key without a backing file
        key: EntryKey,
        /// Order the key held before it was dropped
        order: usize,
    },
    /// Order values were not exactly `0..count`; they were reassigned.
    NonDenseOrders {
        /// Number of entries renumbered
        count: usize,
    },
    /// Data file present on disk with no index line. Only reported by an
    /// explicit orphan sweep, which deletes the file.
    OrphanDataFile {
        /// File name of the orphan
        name: String,
    },
}

impl Fault {
    /// Key the fault concerns, if any
    pub fn key(&self) -> Option<&EntryKey> {
        match self {
            Fault::DuplicateKey { key, .. } | Fault::MissingDataFile { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::MalformedIndexLine { line_number, line } => {
                write!(f, "malformed index line {}: {:?}", line_number, line)
            }
            Fault::DuplicateKey { key, line_number } => {
                write!(f, "duplicate index entry for key {} on line {}", key, line_number)
            }
            Fault::MissingDataFile { key, order } => {
                write!(f, "index entry {} (order {}) has no data file", key, order)
            }
            Fault::NonDenseOrders { count } => {
                write!(f, "index orders were not dense; renumbered {} entries", count)
            }
            Fault::OrphanDataFile { name } => {
                write!(f, "data file {} has no index entry", name)
            }
        }
    }
}

/// Notification fired after an operation commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A new entry was inserted
    Added {
        /// Key of the new entry
        key: EntryKey,
        /// Order assigned to it
        order: usize,
    },
    /// An entry was removed
    Removed {
        /// Key of the removed entry
        key: EntryKey,
        /// Order it held before removal
        order: usize,
    },
    /// An entry's payload was replaced in place
    Updated {
        /// Key of the entry
        key: EntryKey,
        /// Its (unchanged) order
        order: usize,
    },
    /// Every entry was removed
    Cleared {
        /// Number of entries that were present
        removed: usize,
    },
    /// An inconsistency was detected and healed
    Fault(Fault),
}
