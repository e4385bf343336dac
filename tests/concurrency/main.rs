//! Integration tests for locking, async operation, and cancellation.
//!
//! Blocking tests run on plain threads; async tests run on tokio runtimes
//! and mostly stay on the async API.

#[path = "../common/mod.rs"]
mod common;

mod threads;
