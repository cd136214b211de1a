//! Domain models shared across the core and API crates.

pub mod auth;
pub mod meeting;
