//! # confsched_core
//!
//! Core domain logic for Confsched: sessions, identity, Microsoft Graph calls,
//! and the local meeting record store.

pub mod graph;
pub mod identity;
pub mod meetings;
pub mod migrate;
pub mod models;
pub mod session;
pub mod timestamp;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
