//! Services used by the request handlers.

pub mod cookies;
pub mod steps;
pub mod workflow;
