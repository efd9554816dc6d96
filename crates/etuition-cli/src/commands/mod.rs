//! Command implementations.

pub mod api;
pub mod session;
