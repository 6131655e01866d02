//! Domain and wire types shared by the dashboard client and the development
//! backend.
//!
//! Field names follow the REST contract; drafts hold raw form input and are
//! validated into typed field sets before anything is sent.

pub mod errors;
pub mod user;
pub mod project;
pub mod task;
pub mod item;
pub mod person;
pub mod wire;

/// Backend-assigned identifier.
pub type Id = i64;

pub use errors::ModelError;
pub use item::{Item, ItemDraft, ItemFields, ItemPatch, ItemStatus};
pub use person::{Person, PersonDraft, PersonOrigin};
pub use project::{Participant, Project};
pub use task::{Task, TaskDraft, TaskFields, TaskPatch, TaskStatus};
pub use user::{SessionUser, UserProfile};
