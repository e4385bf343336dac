//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
pub use stowage::{
    CollectionConfig, CollectionEvent, EntryKey, ErrorKind, Fault, PersistentList,
    PersistentQueue, PersistentStack, StowageError,
};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (shown with --nocapture).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// ============================================================================
// TestDir - temporary collection directory
// ============================================================================

/// Temporary directory holding one collection.
pub struct TestDir {
    pub dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        init_tracing();
        TestDir {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Path of the collection directory (created lazily by `open`)
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("collection")
    }

    pub fn stack(&self) -> PersistentStack<String> {
        PersistentStack::open(self.path()).expect("Failed to open stack")
    }

    pub fn queue(&self) -> PersistentQueue<String> {
        PersistentQueue::open(self.path()).expect("Failed to open queue")
    }

    pub fn list(&self) -> PersistentList<String> {
        PersistentList::open(self.path()).expect("Failed to open list")
    }

    /// Raw index file content
    pub fn index_text(&self) -> String {
        fs::read_to_string(self.path().join(".index")).unwrap_or_default()
    }

    /// Overwrite the index file
    pub fn write_index(&self, text: &str) {
        fs::write(self.path().join(".index"), text).expect("Failed to write index");
    }

    /// Delete the data file of `key` behind the collection's back
    pub fn delete_data_file(&self, key: &EntryKey) {
        fs::remove_file(self.path().join(key.as_str())).expect("Failed to delete data file");
    }

    /// Data file names currently on disk
    pub fn data_files(&self) -> BTreeSet<String> {
        data_files(&self.path())
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Names of every regular file in `root` except the index and its temp file.
pub fn data_files(root: &Path) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Ok(entries) = fs::read_dir(root) else {
        return names;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_file() && name != ".index" && name != ".index.tmp" {
            names.insert(name);
        }
    }
    names
}

/// Parse the index file into `(key, order)` pairs.
pub fn index_entries(root: &Path) -> Vec<(String, usize)> {
    let text = fs::read_to_string(root.join(".index")).unwrap_or_default();
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut fields = line.split_whitespace();
            let key = fields.next().expect("missing key").to_string();
            let order = fields
                .next()
                .expect("missing order")
                .parse()
                .expect("order is not a number");
            (key, order)
        })
        .collect()
}

/// Orders are exactly `0..count` and the index keys equal the data files.
pub fn assert_dense_invariant(root: &Path) {
    let entries = index_entries(root);
    let mut orders: Vec<usize> = entries.iter().map(|(_, o)| *o).collect();
    orders.sort_unstable();
    let expected: Vec<usize> = (0..entries.len()).collect();
    assert_eq!(orders, expected, "orders are not a dense permutation");

    let keys: BTreeSet<String> = entries.into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, data_files(root), "index keys and data files differ");
}

/// Shared event log for a collection hook
pub type EventLog = Arc<Mutex<Vec<CollectionEvent>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Fault events recorded in `log`
pub fn faults(log: &EventLog) -> Vec<Fault> {
    log.lock()
        .iter()
        .filter_map(|event| match event {
            CollectionEvent::Fault(fault) => Some(fault.clone()),
            _ => None,
        })
        .collect()
}

pub fn s(value: &str) -> String {
    value.to_string()
}
