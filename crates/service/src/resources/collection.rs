use std::collections::HashMap;

use models::Id;
use tracing::{debug, info, warn};

use super::toggle::{Phase, StatusChange};
use super::{Confirm, Resource, ResourceApi};
use crate::errors::ClientError;
use crate::http::ApiClient;

/// Lifecycle of a collection's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No list received yet for the current project.
    Loading,
    Ready,
    /// The first fetch for the current project failed; the list is empty.
    Error,
}

/// The single entry being edited and its unsaved form input.
#[derive(Debug, Clone)]
pub struct EditSession<R: Resource> {
    pub id: Id,
    pub draft: R::Draft,
}

/// In-memory list of one resource family for the active project.
///
/// The collection is the only owner of its entries. Every mutation is
/// pessimistic except the status toggle, which is applied at once and
/// reconciled in `settle`.
pub struct ResourceCollection<R: Resource> {
    api: ResourceApi<R>,
    project_id: Option<Id>,
    entries: Vec<R>,
    state: LoadState,
    banner: Option<String>,
    editing: Option<EditSession<R>>,
    revisions: HashMap<Id, u64>,
}

impl<R: Resource> ResourceCollection<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            api: ResourceApi::new(client),
            project_id: None,
            entries: Vec::new(),
            state: LoadState::Loading,
            banner: None,
            editing: None,
            revisions: HashMap::new(),
        }
    }

    /// Fresh collection that immediately lists `project_id`.
    ///
    /// Failures end up in `state()` and `banner()`; auth failures have
    /// already cleared the session.
    pub async fn mount(client: ApiClient, project_id: Option<Id>) -> Self {
        let mut collection = Self::new(client);
        if let Some(id) = project_id {
            if let Err(e) = collection.set_project(id).await {
                debug!(kind = R::PLURAL, error = %e, "initial fetch failed");
            }
        }
        collection
    }

    pub fn api(&self) -> &ResourceApi<R> {
        &self.api
    }

    pub fn project_id(&self) -> Option<Id> {
        self.project_id
    }

    pub fn entries(&self) -> &[R] {
        &self.entries
    }

    pub fn get(&self, id: Id) -> Option<&R> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Message of the last failed operation, cleared by the next success.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn editing(&self) -> Option<&EditSession<R>> {
        self.editing.as_ref()
    }

    fn position(&self, id: Id) -> Result<usize, ClientError> {
        self.entries
            .iter()
            .position(|e| e.id() == id)
            .ok_or(ClientError::UnknownEntry { kind: R::SINGULAR, id })
    }

    fn require_project(&self) -> Result<Id, ClientError> {
        self.project_id.ok_or(ClientError::NoProject)
    }

    fn bump(&mut self, id: Id) -> u64 {
        let rev = self.revisions.entry(id).or_insert(0);
        *rev += 1;
        *rev
    }

    /// Record a failure in the banner. Session-ending errors are not shown
    /// here; the session manager has already navigated away.
    fn fail(&mut self, err: ClientError) -> ClientError {
        if !err.is_auth() {
            self.banner = Some(err.to_string());
        }
        err
    }

    /// Fetch the list for `project_id`, switching project when it differs.
    pub async fn list(&mut self, project_id: Id) -> Result<&[R], ClientError> {
        if self.project_id != Some(project_id) {
            self.set_project(project_id).await?;
        } else {
            self.reload().await?;
        }
        Ok(&self.entries)
    }

    /// Point the collection at another project and fetch its list.
    ///
    /// Entries of the previous project are dropped before the request, so a
    /// failed fetch leaves an empty list rather than stale rows.
    pub async fn set_project(&mut self, project_id: Id) -> Result<(), ClientError> {
        if self.project_id != Some(project_id) {
            debug!(kind = R::PLURAL, project_id, "project changed");
            self.project_id = Some(project_id);
            self.entries.clear();
            self.revisions.clear();
            self.editing = None;
            self.banner = None;
            self.state = LoadState::Loading;
        }
        self.reload().await
    }

    /// Re-fetch the current project's list.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        self.fetch(true).await
    }

    async fn fetch(&mut self, clear_banner: bool) -> Result<(), ClientError> {
        let project_id = self.require_project()?;
        match self.api.list(project_id).await {
            Ok(entries) => {
                debug!(kind = R::PLURAL, project_id, count = entries.len(), "list fetched");
                self.entries = entries;
                self.state = LoadState::Ready;
                if clear_banner {
                    self.banner = None;
                }
                Ok(())
            }
            Err(e) => {
                if self.state == LoadState::Loading {
                    self.state = LoadState::Error;
                }
                warn!(kind = R::PLURAL, project_id, error = %e, "list fetch failed");
                Err(self.fail(e))
            }
        }
    }

    /// Validate `draft` and create the entry; the backend's object is appended.
    pub async fn create(&mut self, draft: &R::Draft) -> Result<R, ClientError> {
        let fields = R::validate(draft)?;
        let project_id = self.require_project()?;
        match self.api.create(project_id, &fields).await {
            Ok(entry) => {
                info!(kind = R::SINGULAR, id = entry.id(), project_id, "created");
                self.entries.push(entry.clone());
                self.banner = None;
                Ok(entry)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Partial update; the entry is replaced by the backend's object on success.
    pub async fn update(&mut self, id: Id, patch: R::Patch) -> Result<R, ClientError> {
        self.position(id)?;
        // Any toggle still in flight for this entry is now stale.
        self.bump(id);
        match self.api.update(id, &patch).await {
            Ok(entry) => {
                debug!(kind = R::SINGULAR, id, "updated");
                if let Ok(idx) = self.position(id) {
                    self.entries[idx] = entry.clone();
                }
                self.banner = None;
                Ok(entry)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Enter edit mode for `id`, replacing any other edit in progress.
    pub fn start_editing(&mut self, id: Id) -> Result<&mut R::Draft, ClientError> {
        let idx = self.position(id)?;
        let draft = self.entries[idx].draft();
        let session = self.editing.insert(EditSession { id, draft });
        Ok(&mut session.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        self.editing.as_mut().map(|s| &mut s.draft)
    }

    /// Drop the draft; nothing is sent.
    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Validate the draft and send it as an update. Edit mode ends only on
    /// success.
    pub async fn save_edit(&mut self) -> Result<R, ClientError> {
        let Some(session) = self.editing.clone() else {
            let nothing = models::ModelError::Validation("nothing is being edited".into());
            return Err(ClientError::Validation(nothing));
        };
        let fields = R::validate(&session.draft)?;
        let entry = self.update(session.id, R::Patch::from(fields)).await?;
        self.editing = None;
        Ok(entry)
    }

    /// Apply the next status locally and return the change to send.
    pub fn begin_status_toggle(&mut self, id: Id) -> Result<StatusChange<R>, ClientError> {
        let idx = self.position(id)?;
        let previous = self.entries[idx].status();
        let target = R::next_status(previous);
        self.entries[idx].set_status(target);
        let revision = self.bump(id);
        debug!(kind = R::SINGULAR, id, ?previous, ?target, revision, "status toggled locally");
        Ok(StatusChange { id, previous, target, revision, phase: Phase::Tentative })
    }

    /// Reconcile a sent change.
    ///
    /// A confirmation replaces the entry only while its revision is the
    /// latest for that entry. A failure sets the banner and re-fetches the
    /// list to drop the tentative status; the banner survives the re-fetch.
    pub async fn settle(&mut self, change: StatusChange<R>) -> Result<(), ClientError> {
        let latest = self.revisions.get(&change.id).copied().unwrap_or(0);
        match change.phase {
            Phase::Tentative => {
                warn!(kind = R::SINGULAR, id = change.id, "settle called before send");
                Ok(())
            }
            Phase::Confirmed(entry) => {
                if change.revision != latest {
                    debug!(
                        kind = R::SINGULAR,
                        id = change.id,
                        revision = change.revision,
                        latest,
                        "stale confirmation dropped"
                    );
                    return Ok(());
                }
                if let Ok(idx) = self.position(change.id) {
                    self.entries[idx] = entry;
                }
                self.banner = None;
                Ok(())
            }
            Phase::Failed(err) => {
                let err = self.fail(err);
                if err.is_auth() {
                    return Err(err);
                }
                warn!(
                    kind = R::SINGULAR,
                    id = change.id,
                    error = %err,
                    "status change failed; re-fetching"
                );
                if let Err(refetch) = self.fetch(false).await {
                    debug!(kind = R::PLURAL, error = %refetch, "rollback re-fetch failed");
                }
                Err(err)
            }
        }
    }

    /// Optimistic completion toggle: apply, send, reconcile.
    pub async fn toggle_status(&mut self, id: Id) -> Result<R::Status, ClientError> {
        let api = self.api.clone();
        let change = self.begin_status_toggle(id)?.send(&api).await;
        self.settle(change).await?;
        let idx = self.position(id)?;
        Ok(self.entries[idx].status())
    }

    /// Delete after `confirm` agrees. Returns `Ok(false)` when declined; in
    /// that case nothing is sent.
    pub async fn remove(&mut self, id: Id, confirm: &impl Confirm) -> Result<bool, ClientError> {
        self.position(id)?;
        let prompt = format!("Are you sure you want to delete this {}?", R::SINGULAR);
        if !confirm.confirm(&prompt) {
            debug!(kind = R::SINGULAR, id, "delete declined");
            return Ok(false);
        }
        match self.api.delete(id).await {
            Ok(()) => {
                info!(kind = R::SINGULAR, id, "deleted");
                self.entries.retain(|e| e.id() != id);
                self.revisions.remove(&id);
                if self.editing.as_ref().is_some_and(|s| s.id == id) {
                    self.editing = None;
                }
                self.banner = None;
                Ok(true)
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}
