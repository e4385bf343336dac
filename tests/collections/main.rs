//! Integration tests for the collection facades.
//!
//! Covers the ordering laws of each policy, the worked scenarios, update in
//! place, and persistence across instances bound to the same directory.

#[path = "../common/mod.rs"]
mod common;

mod laws;
mod persistence;
mod payloads;
mod scenarios;
