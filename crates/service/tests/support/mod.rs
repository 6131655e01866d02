#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use models::{Id, ItemStatus, TaskStatus};
use server::{spawn_local, AppState, RunningServer};
use service::credentials::{CredentialKey, CredentialStore, FileCredentialStore};
use service::errors::StoreError;
use service::navigation::{Navigator, RecordingNavigator};
use service::{ApiClient, AuthSessionManager, Transport};
use uuid::Uuid;

pub const EMAIL: &str = "demo@example.com";
pub const PASSWORD: &str = "demo-password";

/// Development backend on an ephemeral port plus a client wired to it.
pub struct Harness {
    pub backend: RunningServer,
    pub state: AppState,
    pub navigator: Arc<RecordingNavigator>,
    pub store: Arc<FileCredentialStore>,
    pub creds_path: PathBuf,
    pub client: ApiClient,
    pub demo: Id,
    pub sam: Id,
    pub launch: Id,
    pub retreat: Id,
}

impl Harness {
    pub fn session(&self) -> &Arc<AuthSessionManager> {
        self.client.session()
    }

    pub async fn stored(&self, key: CredentialKey) -> Option<String> {
        self.store.get(key).await
    }

    /// A second client over the same credential file, as after a restart.
    pub async fn reopen(&self) -> anyhow::Result<ApiClient> {
        let store = FileCredentialStore::open(&self.creds_path).await?;
        Ok(self.client_over(store, Arc::new(RecordingNavigator::default())).await)
    }

    /// A client against the same backend over another credential store.
    pub async fn client_over(
        &self,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiClient {
        let transport = Transport::with_base_url(&self.backend.base_url);
        let session = AuthSessionManager::restore(transport.clone(), store, navigator).await;
        ApiClient::new(transport, session)
    }
}

/// Seeded backend, nobody signed in.
pub async fn harness() -> anyhow::Result<Harness> {
    let state = AppState::new();
    let demo = state.add_user(EMAIL, PASSWORD, "demo");
    let sam = state.add_user("sam@example.com", "sam-password", "sam");
    let launch = state.add_event(
        "Launch Party",
        Some("Product launch evening."),
        &[(demo, "organizer"), (sam, "caterer")],
    );
    let retreat = state.add_event("Team Retreat", None, &[(demo, "organizer")]);
    state.add_task(launch, "Book the venue", "demo", TaskStatus::Pending);
    state.add_task(launch, "Send invitations", "sam", TaskStatus::Completed);
    state.add_task(retreat, "Pick a location", "demo", TaskStatus::Pending);
    state.add_item(launch, "Balloons", 50, 0.25, "demo", ItemStatus::Pending);

    let backend = spawn_local(state.clone()).await?;
    let creds_path = std::env::temp_dir().join(format!("dash_test_{}.json", Uuid::new_v4()));
    let store = FileCredentialStore::open(&creds_path).await?;
    let navigator = Arc::new(RecordingNavigator::default());
    let transport = Transport::with_base_url(&backend.base_url);
    let session = AuthSessionManager::restore(
        transport.clone(),
        store.clone() as Arc<dyn CredentialStore>,
        navigator.clone() as Arc<dyn Navigator>,
    )
    .await;
    let client = ApiClient::new(transport, session);

    Ok(Harness { backend, state, navigator, store, creds_path, client, demo, sam, launch, retreat })
}

/// Seeded backend with the demo user signed in.
pub async fn signed_in() -> anyhow::Result<Harness> {
    let h = harness().await?;
    h.session().login(EMAIL, PASSWORD).await?;
    Ok(h)
}

/// Confirm prompt that always answers `answer`.
pub fn answer(answer: bool) -> impl Fn(&str) -> bool {
    move |_prompt: &str| answer
}

/// Credential store that refuses writes of one key, like a full disk would.
pub struct FailingWrites {
    inner: Arc<FileCredentialStore>,
    refuse: Mutex<Option<CredentialKey>>,
}

impl FailingWrites {
    pub fn over(inner: Arc<FileCredentialStore>) -> Arc<Self> {
        Arc::new(Self { inner, refuse: Mutex::new(None) })
    }

    pub fn refuse(&self, key: Option<CredentialKey>) {
        *self.refuse.lock().unwrap() = key;
    }
}

#[async_trait]
impl CredentialStore for FailingWrites {
    async fn get(&self, key: CredentialKey) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<(), StoreError> {
        if *self.refuse.lock().unwrap() == Some(key) {
            return Err(StoreError::Io("disk full".into()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: CredentialKey) -> Result<bool, StoreError> {
        self.inner.remove(key).await
    }
}
