use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use dashmap::DashMap;
use models::{Id, Item, ItemStatus, Participant, Project, Task, TaskStatus, UserProfile};
use models::wire::ErrorBody;

use crate::errors::ApiError;

/// One-shot misbehaviour for the next call of an operation.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Reply with `status` once `after` has elapsed; `message` of `None`
    /// sends an empty error body.
    Fail { status: StatusCode, message: Option<String>, after: Duration },
    /// Auth endpoints answer 200 without a token.
    OmitToken,
    /// Auth endpoints put the token under the other endpoint's field name.
    SwapTokenField,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredUser {
    pub profile: UserProfile,
    pub password: String,
}

#[derive(Default)]
struct Tables {
    users: DashMap<Id, StoredUser>,
    tokens: DashMap<String, Id>,
    events: DashMap<Id, Project>,
    tasks: DashMap<Id, Task>,
    items: DashMap<Id, Item>,
    faults: DashMap<String, Fault>,
    hits: DashMap<String, usize>,
}

/// Shared backend state; clones share the same tables.
#[derive(Clone)]
pub struct AppState {
    tables: Arc<Tables>,
    next_id: Arc<AtomicI64>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self { tables: Arc::new(Tables::default()), next_id: Arc::new(AtomicI64::new(1)) }
    }

    fn next_id(&self) -> Id {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn add_user(&self, email: &str, password: &str, username: &str) -> Id {
        let id = self.next_id();
        let profile = UserProfile { id, username: username.to_string(), email: email.to_string() };
        self.tables.users.insert(id, StoredUser { profile, password: password.to_string() });
        id
    }

    pub(crate) fn find_user_by_email(&self, email: &str) -> Option<StoredUser> {
        self.tables
            .users
            .iter()
            .find(|u| u.profile.email.eq_ignore_ascii_case(email))
            .map(|u| u.value().clone())
    }

    pub fn user(&self, id: Id) -> Option<UserProfile> {
        self.tables.users.get(&id).map(|u| u.profile.clone())
    }

    pub fn issue_token(&self, user_id: Id) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.tables.tokens.insert(token.clone(), user_id);
        token
    }

    pub fn user_for_token(&self, token: &str) -> Option<Id> {
        self.tables.tokens.get(token).map(|id| *id)
    }

    /// Forget every issued token, as a backend restart with new secrets would.
    pub fn revoke_tokens(&self) {
        self.tables.tokens.clear();
    }

    pub fn add_event(
        &self,
        title: &str,
        description: Option<&str>,
        participants: &[(Id, &str)],
    ) -> Id {
        let id = self.next_id();
        let project = Project {
            id,
            title: title.to_string(),
            description: description.unwrap_or_default().to_string(),
            participants: participants
                .iter()
                .map(|(user_id, role)| Participant { user_id: *user_id, role: role.to_string() })
                .collect(),
        };
        self.tables.events.insert(id, project);
        id
    }

    pub fn event(&self, id: Id) -> Option<Project> {
        self.tables.events.get(&id).map(|e| e.clone())
    }

    /// Events `user_id` participates in, ordered by id.
    pub fn events_for(&self, user_id: Id) -> Vec<Project> {
        let mut events: Vec<Project> = self
            .tables
            .events
            .iter()
            .filter(|e| e.participants.iter().any(|p| p.user_id == user_id))
            .map(|e| e.value().clone())
            .collect();
        events.sort_by_key(|e| e.id);
        events
    }

    pub fn add_task(
        &self,
        event_id: Id,
        description: &str,
        owner: &str,
        status: TaskStatus,
    ) -> Task {
        let task = Task {
            id: self.next_id(),
            event_id: Some(event_id),
            description: description.to_string(),
            owner: owner.to_string(),
            status,
        };
        self.tables.tasks.insert(task.id, task.clone());
        task
    }

    pub fn task(&self, id: Id) -> Option<Task> {
        self.tables.tasks.get(&id).map(|t| t.clone())
    }

    pub fn tasks_for(&self, event_id: Id) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tables
            .tasks
            .iter()
            .filter(|t| t.event_id == Some(event_id))
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    pub(crate) fn update_task<F: FnOnce(&mut Task)>(&self, id: Id, f: F) -> Option<Task> {
        let mut entry = self.tables.tasks.get_mut(&id)?;
        f(entry.value_mut());
        Some(entry.clone())
    }

    pub(crate) fn delete_task(&self, id: Id) -> bool {
        self.tables.tasks.remove(&id).is_some()
    }

    pub fn add_item(
        &self,
        event_id: Id,
        name: &str,
        quantity: i64,
        price: f64,
        owner: &str,
        status: ItemStatus,
    ) -> Item {
        let item = Item {
            id: self.next_id(),
            event_id: Some(event_id),
            name: name.to_string(),
            quantity,
            price,
            owner: owner.to_string(),
            status,
        };
        self.tables.items.insert(item.id, item.clone());
        item
    }

    pub fn item(&self, id: Id) -> Option<Item> {
        self.tables.items.get(&id).map(|i| i.clone())
    }

    pub fn items_for(&self, event_id: Id) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .tables
            .items
            .iter()
            .filter(|i| i.event_id == Some(event_id))
            .map(|i| i.value().clone())
            .collect();
        items.sort_by_key(|i| i.id);
        items
    }

    pub(crate) fn update_item<F: FnOnce(&mut Item)>(&self, id: Id, f: F) -> Option<Item> {
        let mut entry = self.tables.items.get_mut(&id)?;
        f(entry.value_mut());
        Some(entry.clone())
    }

    pub(crate) fn delete_item(&self, id: Id) -> bool {
        self.tables.items.remove(&id).is_some()
    }

    /// Make the next call of `op` fail with `status`.
    pub fn fail_next(&self, op: &str, status: StatusCode, message: Option<&str>) {
        self.fail_next_after(op, status, message, Duration::ZERO);
    }

    /// Like `fail_next`, but the reply is held back for `after`.
    pub fn fail_next_after(
        &self,
        op: &str,
        status: StatusCode,
        message: Option<&str>,
        after: Duration,
    ) {
        let fault = Fault::Fail { status, message: message.map(str::to_string), after };
        self.tables.faults.insert(op.to_string(), fault);
    }

    pub fn omit_token_next(&self, op: &str) {
        self.tables.faults.insert(op.to_string(), Fault::OmitToken);
    }

    pub fn swap_token_field_next(&self, op: &str) {
        self.tables.faults.insert(op.to_string(), Fault::SwapTokenField);
    }

    /// Number of calls that reached `op`, faulted ones included.
    pub fn hits(&self, op: &str) -> usize {
        self.tables.hits.get(op).map(|h| *h).unwrap_or(0)
    }

    /// Count the call and consume a pending fault for `op`.
    pub(crate) fn enter(&self, op: &str) -> Option<Fault> {
        *self.tables.hits.entry(op.to_string()).or_insert(0) += 1;
        self.tables.faults.remove(op).map(|(_, f)| f)
    }

    /// `enter` for endpoints that only know how to fail.
    pub(crate) async fn check(&self, op: &str) -> Result<(), ApiError> {
        match self.enter(op) {
            Some(Fault::Fail { status, message, after }) => {
                Err(failure(status, message, after).await)
            }
            _ => Ok(()),
        }
    }
}

pub(crate) async fn failure(
    status: StatusCode,
    message: Option<String>,
    after: Duration,
) -> ApiError {
    if !after.is_zero() {
        tokio::time::sleep(after).await;
    }
    ApiError { status, body: ErrorBody { message, error: None } }
}
