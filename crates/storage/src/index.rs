//! Index engine: the authoritative `key -> order` mapping
//!
//! The index file holds one `"<key> <order>"` record per line, in no
//! particular line order. An `IndexMap` is derived fresh from that file on
//! every operation, mutated through the primitives below, and written back
//! wholesale.
//!
//! # Invariant
//!
//! After every committed operation the order values are exactly
//! `{0, …, len-1}` (a dense permutation). The primitives preserve it:
//!
//! - `shift_and_insert(at)`: orders `>= at` move up by one, new key takes `at`
//! - `remove_and_renumber(at)`: drops `at`, orders `> at` move down by one
//!
//! `heal` and parse-time repairs can break density; `compact` restores it.

use std::collections::{BTreeMap, BTreeSet};
use stowage_core::{EntryKey, Fault, StowageError, StowageResult};

/// Result of parsing an index file
#[derive(Debug, Clone, Default)]
pub struct ParsedIndex {
    /// Entries that parsed cleanly
    pub map: IndexMap,
    /// Lines that were dropped
    pub faults: Vec<Fault>,
}

/// In-memory copy of the index file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMap {
    entries: BTreeMap<EntryKey, usize>,
}

impl IndexMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order currently held by `key`
    pub fn order_of(&self, key: &str) -> Option<usize> {
        self.entries.get(key).copied()
    }

    /// True if `key` is indexed
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Key holding `order`.
    ///
    /// Linear scan; the index is re-read from disk on every call anyway, so
    /// keeping a reverse map would not save an I/O.
    pub fn key_at(&self, order: usize) -> Option<&EntryKey> {
        self.entries
            .iter()
            .find(|(_, o)| **o == order)
            .map(|(k, _)| k)
    }

    /// Entry with the lowest order
    pub fn front(&self) -> Option<(&EntryKey, usize)> {
        self.entries
            .iter()
            .min_by_key(|(k, o)| (**o, *k))
            .map(|(k, o)| (k, *o))
    }

    /// Entry with the highest order
    pub fn back(&self) -> Option<(&EntryKey, usize)> {
        self.entries
            .iter()
            .max_by_key(|(k, o)| (**o, *k))
            .map(|(k, o)| (k, *o))
    }

    /// Keys sorted by ascending order (ties broken by key)
    pub fn ordered_keys(&self) -> Vec<EntryKey> {
        let mut pairs: Vec<(&EntryKey, usize)> =
            self.entries.iter().map(|(k, o)| (k, *o)).collect();
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        pairs.into_iter().map(|(k, _)| k.clone()).collect()
    }

    /// Iterate `(key, order)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&EntryKey, usize)> {
        self.entries.iter().map(|(k, o)| (k, *o))
    }

    /// True if orders are exactly `0..len`
    pub fn is_dense(&self) -> bool {
        let mut seen = vec![false; self.entries.len()];
        for order in self.entries.values() {
            match seen.get_mut(*order) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    // ========================================================================
    // Parse / render
    // ========================================================================

    /// Parse index file content.
    ///
    /// Blank lines are ignored. A line that does not split into exactly two
    /// whitespace-separated fields, whose key is not a valid `EntryKey`, or
    /// whose order is not a non-negative integer is dropped and reported as a
    /// fault. A repeated key keeps its first occurrence.
    pub fn parse(text: &str) -> ParsedIndex {
        let mut parsed = ParsedIndex::default();

        for (idx, line) in text.lines().enumerate() {
            let line_number = idx + 1;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            let record = match fields.as_slice() {
                [key, order] => EntryKey::parse(key)
                    .ok()
                    .zip(order.parse::<usize>().ok()),
                _ => None,
            };

            let Some((key, order)) = record else {
                parsed.faults.push(Fault::MalformedIndexLine {
                    line_number,
                    line: line.to_string(),
                });
                continue;
            };

            if parsed.map.entries.contains_key(&key) {
                parsed.faults.push(Fault::DuplicateKey { key, line_number });
                continue;
            }
            parsed.map.entries.insert(key, order);
        }

        parsed
    }

    /// Render as index file content, one `"<key> <order>"` line per entry.
    ///
    /// Lines are emitted in ascending order for readability; readers must not
    /// rely on it.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 40);
        for key in self.ordered_keys() {
            let order = self.entries[&key];
            out.push_str(key.as_str());
            out.push(' ');
            out.push_str(&order.to_string());
            out.push('\n');
        }
        out
    }

    // ========================================================================
    // Mutation primitives
    // ========================================================================

    /// Order for a tail insertion: `max + 1`, or `0` when empty.
    pub fn allocate_append_order(&self) -> usize {
        self.entries.values().max().map_or(0, |max| max + 1)
    }

    /// Insert `key` at `at_order`, shifting every entry at `>= at_order` up by one.
    pub fn shift_and_insert(&mut self, key: EntryKey, at_order: usize) -> StowageResult<()> {
        if self.entries.contains_key(&key) {
            return Err(StowageError::invalid_argument(format!(
                "key {} is already indexed",
                key
            )));
        }
        if at_order > self.entries.len() {
            return Err(StowageError::IndexOutOfRange {
                index: at_order,
                count: self.entries.len(),
            });
        }

        for order in self.entries.values_mut() {
            if *order >= at_order {
                *order += 1;
            }
        }
        self.entries.insert(key, at_order);
        Ok(())
    }

    /// Drop the entry at `removed_order`, shifting every entry above it down by one.
    ///
    /// Returns the removed key, or `None` if no entry held that order (the
    /// map is left untouched in that case).
    pub fn remove_and_renumber(&mut self, removed_order: usize) -> Option<EntryKey> {
        let key = self.key_at(removed_order)?.clone();
        self.entries.remove(&key);
        for order in self.entries.values_mut() {
            if *order > removed_order {
                *order -= 1;
            }
        }
        Some(key)
    }

    /// Drop `key` (if present) and renumber the entries above it.
    pub fn remove_key(&mut self, key: &str) -> Option<usize> {
        let order = self.order_of(key)?;
        self.remove_and_renumber(order);
        Some(order)
    }

    // ========================================================================
    // Healing
    // ========================================================================

    /// Drop every key whose data file is not in `present`.
    ///
    /// Orders are not renumbered; call [`compact`](Self::compact) afterwards
    /// to restore density.
    pub fn heal(&mut self, present: &BTreeSet<String>) -> Vec<Fault> {
        let missing: Vec<(EntryKey, usize)> = self
            .entries
            .iter()
            .filter(|(k, _)| !present.contains(k.as_str()))
            .map(|(k, o)| (k.clone(), *o))
            .collect();

        missing
            .into_iter()
            .map(|(key, order)| {
                self.entries.remove(&key);
                Fault::MissingDataFile { key, order }
            })
            .collect()
    }

    /// Reassign orders `0..len` by ascending original order (ties by key).
    ///
    /// Returns true if any order changed.
    pub fn compact(&mut self) -> bool {
        let mut changed = false;
        for (new_order, key) in self.ordered_keys().into_iter().enumerate() {
            if let Some(order) = self.entries.get_mut(&key) {
                if *order != new_order {
                    *order = new_order;
                    changed = true;
                }
            }
        }
        changed
    }
}

/// Outcome of reconciling a parsed index with the directory listing
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Healed, dense map
    pub map: IndexMap,
    /// Faults found while parsing and healing
    pub faults: Vec<Fault>,
    /// True if the map differs from the file and must be written back
    pub needs_persist: bool,
}

/// Heal and compact a freshly parsed index against the files present on disk.
///
/// Parse faults and missing files are reported individually; a
/// `NonDenseOrders` fault is only added when nothing else explains the gap
/// (for example a hand-edited index with repeated order values).
pub fn reconcile(parsed: ParsedIndex, present: &BTreeSet<String>) -> Reconciled {
    let ParsedIndex { mut map, mut faults } = parsed;

    faults.extend(map.heal(present));

    let dense = map.is_dense();
    if !dense && faults.is_empty() {
        faults.push(Fault::NonDenseOrders { count: map.len() });
    }
    map.compact();

    Reconciled {
        needs_persist: !faults.is_empty(),
        map,
        faults,
    }
}
