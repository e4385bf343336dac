//! Integration tests for self-healing and the dense-order invariant.
//!
//! These tests damage a collection directory out of band (delete data
//! files, hand-edit the index, drop stray files) and check that the next
//! operation repairs it, reports each fault exactly once, and never fails
//! the caller unless the caller addressed the damaged entry.

#[path = "../common/mod.rs"]
mod common;

mod io_failures;
mod orphans;
