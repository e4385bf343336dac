//! Stowage - disk-backed, thread-safe ordered collections
//!
//! Stowage keeps a stack, a queue, or a list in a directory: one file per
//! entry plus an index file mapping each entry key to its position. Every
//! instance survives process restarts and repairs its own index when files
//! go missing underneath it.
//!
//! # Quick Start
//!
//! ```ignore
//! use stowage::{PersistentStack, PersistentQueue, PersistentList};
//!
//! let undo = PersistentStack::<String>::open("/var/lib/app/undo")?;
//! undo.push(&"insert line 4".to_string())?;
//! let last = undo.pop()?;
//!
//! let jobs = PersistentQueue::<u64>::open("/var/lib/app/jobs")?;
//! jobs.enqueue(&42)?;
//!
//! let recent = PersistentList::<String>::open("/var/lib/app/recent")?;
//! recent.insert(0, &"notes.txt".to_string())?;
//! ```
//!
//! # Architecture
//!
//! - `stowage-core`: keys, selectors, events, and the error taxonomy
//! - `stowage-storage`: the directory, the index engine, and the ordered store
//! - `stowage-primitives`: typed collections, codecs, config, and event hooks
//!
//! Only the collection-level API is re-exported here.

pub use stowage_core::{
    CollectionEvent, EntryKey, ErrorKind, Fault, Placement, Selector, StowageError, StowageResult,
};
pub use stowage_primitives::{
    json_payload, BytesCodec, CancellationToken, CodecError, Collection, CollectionConfig, Fifo,
    Indexed, JsonCodec, Lifo, Payload, PayloadCodec, PersistentList, PersistentQueue,
    PersistentStack, Policy, Snapshot, SnapshotIter, SubscriptionId, TextCodec, TextEnvelope,
    CONFIG_FILE_NAME,
};
