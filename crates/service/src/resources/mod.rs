//! Per-project resource lists kept in sync with the backend.
//!
//! `Resource` describes one REST resource family (tasks, items); the
//! collection, API client and toggle state machine are generic over it.

pub mod api;
pub mod collection;
pub mod toggle;

use std::fmt::Debug;

use models::{
    Id, Item, ItemDraft, ItemFields, ItemPatch, ItemStatus, ModelError, Task, TaskDraft, TaskFields,
    TaskPatch, TaskStatus,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::Api;

pub use api::ResourceApi;
pub use collection::{EditSession, LoadState, ResourceCollection};
pub use toggle::{Phase, StatusChange};

/// A backend resource scoped to a project, with a two-or-more state status.
pub trait Resource: Clone + Debug + Send + Sync + DeserializeOwned + 'static {
    type Status: Copy + Debug + PartialEq + Send + Sync;
    /// Raw form input.
    type Draft: Clone + Debug + Default + Send + Sync;
    /// Validated create body.
    type Fields: Serialize + Send + Sync;
    /// Partial update body.
    type Patch: Serialize + Clone + Debug + Send + Sync + From<Self::Fields>;

    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// Base URL the resource's endpoints live under.
    const API: Api;

    fn id(&self) -> Id;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    /// Status the completion checkbox moves to from `status`.
    fn next_status(status: Self::Status) -> Self::Status;
    fn status_patch(status: Self::Status) -> Self::Patch;
    fn draft(&self) -> Self::Draft;
    fn validate(draft: &Self::Draft) -> Result<Self::Fields, ModelError>;
}

impl Resource for Task {
    type Status = TaskStatus;
    type Draft = TaskDraft;
    type Fields = TaskFields;
    type Patch = TaskPatch;

    const SINGULAR: &'static str = "task";
    const PLURAL: &'static str = "tasks";
    const API: Api = Api::Tasks;

    fn id(&self) -> Id {
        self.id
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    fn next_status(status: TaskStatus) -> TaskStatus {
        status.toggled()
    }

    fn status_patch(status: TaskStatus) -> TaskPatch {
        TaskPatch::status(status)
    }

    fn draft(&self) -> TaskDraft {
        Task::draft(self)
    }

    fn validate(draft: &TaskDraft) -> Result<TaskFields, ModelError> {
        draft.validate()
    }
}

impl Resource for Item {
    type Status = ItemStatus;
    type Draft = ItemDraft;
    type Fields = ItemFields;
    type Patch = ItemPatch;

    const SINGULAR: &'static str = "item";
    const PLURAL: &'static str = "items";
    const API: Api = Api::Items;

    fn id(&self) -> Id {
        self.id
    }

    fn status(&self) -> ItemStatus {
        self.status
    }

    fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }

    fn next_status(status: ItemStatus) -> ItemStatus {
        status.toggled()
    }

    fn status_patch(status: ItemStatus) -> ItemPatch {
        ItemPatch::status(status)
    }

    fn draft(&self) -> ItemDraft {
        Item::draft(self)
    }

    fn validate(draft: &ItemDraft) -> Result<ItemFields, ModelError> {
        draft.validate()
    }
}

/// Interactive yes/no prompt guarding destructive operations.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
