//! Client-side session and resource synchronization for the event dashboard.
//! - `auth` owns the token lifecycle; it is the only writer of session state.
//! - `http` attaches the bearer token and maps responses into `ClientError`.
//! - `resources` keeps per-project task/item lists in sync with the backend.
//! - `dashboard` selects the active project and mounts one tab at a time.

pub mod errors;
pub mod storage;
pub mod credentials;
pub mod navigation;
pub mod auth;
pub mod http;
pub mod metrics;
pub mod resources;
pub mod people;
pub mod dashboard;
pub mod runtime;

pub use auth::service::AuthSessionManager;
pub use dashboard::{Dashboard, Tab, TabView};
pub use errors::{ClientError, StoreError};
pub use http::{ApiClient, Transport};
pub use people::PeopleDirectory;
pub use resources::{Confirm, LoadState, Resource, ResourceCollection};
