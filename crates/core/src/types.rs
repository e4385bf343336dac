//! Entry addressing types
//!
//! An entry is physically split across a data file named by its `EntryKey`
//! and one `"<key> <order>"` line in the index file. Keys are therefore
//! restricted to characters that are safe both as a file name and as a
//! whitespace-delimited index field.

use crate::error::{StowageError, StowageResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LEN: usize = 255;

/// Opaque identifier of one stored entry.
///
/// Generated keys are random 128-bit UUIDs rendered as 32 lowercase hex
/// characters, so two inserts never collide on a file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryKey(String);

impl EntryKey {
    /// Generate a fresh random key
    pub fn generate() -> Self {
        EntryKey(Uuid::new_v4().simple().to_string())
    }

    /// Validate and wrap a caller-supplied key.
    ///
    /// Rejects keys that are empty, too long, start with `.`, or contain
    /// whitespace, path separators, or control characters.
    pub fn parse(raw: impl AsRef<str>) -> StowageResult<Self> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(StowageError::invalid_argument("entry key is empty"));
        }
        if raw.len() > MAX_KEY_LEN {
            return Err(StowageError::invalid_argument(format!(
                "entry key exceeds {} bytes",
                MAX_KEY_LEN
            )));
        }
        if raw.starts_with('.') {
            return Err(StowageError::invalid_argument(format!(
                "entry key '{}' must not start with '.'",
                raw
            )));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '\\' | ':'))
        {
            return Err(StowageError::invalid_argument(format!(
                "entry key '{}' contains forbidden character {:?}",
                raw, c
            )));
        }
        Ok(EntryKey(raw.to_string()))
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryKey {
    type Error = StowageError;

    fn try_from(value: String) -> StowageResult<Self> {
        EntryKey::parse(value)
    }
}

impl TryFrom<&str> for EntryKey {
    type Error = StowageError;

    fn try_from(value: &str) -> StowageResult<Self> {
        EntryKey::parse(value)
    }
}

impl From<EntryKey> for String {
    fn from(key: EntryKey) -> Self {
        key.0
    }
}

/// How a read or removal addresses an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Entry with the lowest order (stack top, queue front, list head)
    Front,
    /// Entry with the highest order
    Back,
    /// Entry with the given key
    Key(EntryKey),
    /// Entry at the given order
    Order(usize),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Front => f.write_str("front"),
            Selector::Back => f.write_str("back"),
            Selector::Key(key) => write!(f, "key {}", key),
            Selector::Order(order) => write!(f, "order {}", order),
        }
    }
}

/// Where a new entry lands in the ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Order 0; every existing entry shifts up by one
    Front,
    /// Order `count`; nothing moves
    Append,
    /// Order `i`; entries at `>= i` shift up by one. `i == count` appends.
    At(usize),
}
