//! Session lifecycle: login, register, logout and token invalidation.
//!
//! `AuthSessionManager` is the single writer of session state. Readers take
//! `Session` snapshots; nothing else mutates the token.

pub mod domain;
pub mod errors;
pub mod service;
