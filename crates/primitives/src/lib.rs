//! Primitives layer for stowage
//!
//! Provides typed, thread-safe collections over the ordered store:
//! - **PersistentStack**: LIFO, new entries on top
//! - **PersistentQueue**: FIFO, new entries at the back
//! - **PersistentList**: explicit positions, append by default
//!
//! All three are the same [`Collection`] with a different placement
//! [`Policy`](policy::Policy). Every entry is one file in the collection
//! directory; the index file maps each key to its position.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stowage_primitives::{CollectionConfig, PersistentQueue};
//!
//! let jobs = PersistentQueue::<String>::open("/var/lib/app/jobs")?;
//! jobs.on_event(|event| tracing::debug!(?event, "queue event"));
//! jobs.enqueue(&"resize".to_string())?;
//! let next = jobs.dequeue()?;
//! ```
//!
//! ## Async
//!
//! Every mutating and reading operation has an `*_async` twin that takes a
//! `tokio_util::sync::CancellationToken`. Blocking methods may be called
//! from a multi-thread runtime; on a current-thread runtime they return
//! `InvalidArgument`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod collection;
pub mod config;
pub mod events;
pub mod list;
pub mod policy;
pub mod queue;
pub mod snapshot;
pub mod stack;

pub use codec::{BytesCodec, CodecError, JsonCodec, Payload, PayloadCodec, TextCodec, TextEnvelope};
pub use collection::Collection;
pub use config::{CollectionConfig, CONFIG_FILE_NAME};
pub use events::{EventCallback, EventHooks, SubscriptionId};
pub use list::PersistentList;
pub use policy::{Fifo, Indexed, Lifo, Policy};
pub use queue::PersistentQueue;
pub use snapshot::{Snapshot, SnapshotIter};
pub use stack::PersistentStack;
pub use tokio_util::sync::CancellationToken;
