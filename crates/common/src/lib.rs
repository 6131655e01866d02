//! Shared runtime helpers for the dashboard binaries and development server.

pub mod utils;
pub mod env;
