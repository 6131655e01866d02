//! Runtime wiring
//!
//! Builds the credential store, session manager and API client from an
//! `AppConfig`, so binaries only depend on `service`.

use std::sync::Arc;

use configs::AppConfig;
use tracing::info;

use crate::auth::service::AuthSessionManager;
use crate::credentials::{CredentialStore, FileCredentialStore};
use crate::http::{ApiClient, Transport};
use crate::navigation::Navigator;

/// Open the credential file, restore the session and return a ready client.
pub async fn connect(cfg: &AppConfig, navigator: Arc<dyn Navigator>) -> anyhow::Result<ApiClient> {
    common::env::check_base_url("api.base_url", &cfg.api.base_url);
    common::env::check_base_url("api.tasks_base_url", cfg.api.tasks_base());
    common::env::check_base_url("api.items_base_url", cfg.api.items_base());
    common::env::ensure_parent_dir(&cfg.storage.credentials_path).await?;

    let store: Arc<dyn CredentialStore> =
        FileCredentialStore::open(&cfg.storage.credentials_path).await?;
    let transport = Transport::new(&cfg.api)?;
    let session = AuthSessionManager::restore(transport.clone(), store, navigator).await;
    info!(
        base_url = %cfg.api.base_url,
        credentials = %cfg.storage.credentials_path.display(),
        authenticated = session.is_authenticated(),
        "client ready"
    );
    Ok(ApiClient::new(transport, session))
}
