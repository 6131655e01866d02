//! Durable credential storage.
//!
//! Three logical keys live here: the auth token, the remembered login email
//! and the cached user profile (JSON). Nothing expires on its own; a stale
//! token is only noticed when the backend rejects it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::storage::json_map_store::JsonMapStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    Token,
    RememberedEmail,
    User,
}

impl CredentialKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKey::Token => "token",
            CredentialKey::RememberedEmail => "rememberedEmail",
            CredentialKey::User => "user",
        }
    }
}

/// Trait abstraction for credential storage.
/// `set` overwrites; `remove` reports whether a value existed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: CredentialKey) -> Option<String>;
    async fn set(&self, key: CredentialKey, value: String) -> Result<(), StoreError>;
    async fn remove(&self, key: CredentialKey) -> Result<bool, StoreError>;
}

/// File-backed credential store, one JSON object per file.
#[derive(Clone)]
pub struct FileCredentialStore {
    store: Arc<JsonMapStore<String, String>>,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating the file if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let store = JsonMapStore::<String, String>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Option<String> {
        self.store.get(&key.as_str().to_string()).await
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<(), StoreError> {
        self.store.insert(key.as_str().to_string(), value).await
    }

    async fn remove(&self, key: CredentialKey) -> Result<bool, StoreError> {
        self.store.remove(&key.as_str().to_string()).await
    }
}
