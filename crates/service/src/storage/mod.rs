//! Storage abstractions for the client
//!
//! A small JSON-file map backs the credential store.

pub mod json_map_store;
