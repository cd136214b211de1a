//! Request handlers.

pub mod graph;
pub mod home;
pub mod identity;
pub mod meetings;
