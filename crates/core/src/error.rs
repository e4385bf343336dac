//! Error types for stowage collections
//!
//! Every public operation returns `StowageResult<T>`. The variants follow the
//! collection error taxonomy:
//!
//! - **InvalidArgument / IndexOutOfRange**: bad key, empty path, index past the end
//! - **NotFound**: key absent from the index
//! - **EmptyCollection**: pop/dequeue/peek with no entries
//! - **Corruption**: reserved; the store heals index damage and reports it as a
//!   fault event, so it never returns this variant itself
//! - **Io**: the underlying filesystem call failed
//! - **Serialization**: the payload codec rejected an item or a stored payload
//! - **Cancelled**: an asynchronous call observed its cancellation token
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for stowage operations
pub type StowageResult<T> = std::result::Result<T, StowageError>;

/// Error types for stowage collections
#[derive(Debug, Error)]
pub enum StowageError {
    /// Null/empty directory or key, malformed configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Positional access past the end of the collection
    #[error("Index {index} out of range for collection of {count} entries")]
    IndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of entries at the time of the call
        count: usize,
    },

    /// Key absent from the index
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Pop/dequeue/peek on a collection with no entries
    #[error("Collection is empty")]
    EmptyCollection,

    /// Index and data files disagree.
    ///
    /// Reserved: the store heals these cases and reports them as
    /// [`Fault`](crate::Fault) events instead. Custom codecs and callers
    /// layering checks over stored payloads may raise it.
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Filesystem operation failed
    #[error("I/O error while {context}: {source}")]
    Io {
        /// What the store was doing when the call failed
        context: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Payload codec failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cooperative cancellation of an asynchronous call
    #[error("Operation cancelled")]
    Cancelled,
}

/// Stable classification of a `StowageError`.
///
/// `IndexOutOfRange` is reported as `InvalidArgument`, so callers can match
/// on the taxonomy without caring which flavour of bad argument they sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad argument (including out-of-range positions)
    InvalidArgument,
    /// Key absent
    NotFound,
    /// No entries
    EmptyCollection,
    /// Index/data disagreement
    Corruption,
    /// Filesystem failure
    Io,
    /// Codec failure
    Serialization,
    /// Cancelled by the caller
    Cancelled,
}

impl StowageError {
    /// Build an `InvalidArgument` error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        StowageError::InvalidArgument(msg.into())
    }

    /// Build a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        StowageError::NotFound(what.into())
    }

    /// Build a `Corruption` error
    pub fn corruption(msg: impl Into<String>) -> Self {
        StowageError::Corruption(msg.into())
    }

    /// Wrap an I/O error with the operation that produced it
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        StowageError::Io {
            context: context.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StowageError::InvalidArgument(_) | StowageError::IndexOutOfRange { .. } => {
                ErrorKind::InvalidArgument
            }
            StowageError::NotFound(_) => ErrorKind::NotFound,
            StowageError::EmptyCollection => ErrorKind::EmptyCollection,
            StowageError::Corruption(_) => ErrorKind::Corruption,
            StowageError::Io { .. } => ErrorKind::Io,
            StowageError::Serialization(_) => ErrorKind::Serialization,
            StowageError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// True if the error was produced by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StowageError::Cancelled)
    }
}

impl From<io::Error> for StowageError {
    fn from(e: io::Error) -> Self {
        StowageError::io("performing filesystem operation", e)
    }
}
