//! In-memory development backend implementing the dashboard's REST contract.
//!
//! Tables live in `DashMap`s and vanish with the process. Tests drive failure
//! paths through one-shot faults registered on `AppState`.

pub mod state;
pub mod errors;
pub mod auth;
pub mod events;
pub mod resources;
pub mod routes;
pub mod seed;
pub mod startup;

pub use startup::{run, spawn_local, RunningServer};
pub use state::{AppState, Fault};
