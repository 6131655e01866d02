//! Environment/runtime helpers
//!
//! Sanity checks to ensure the credential file location is usable at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the directory holding `file_path` exists; creates it when missing.
pub async fn ensure_parent_dir(file_path: &Path) -> anyhow::Result<()> {
    let Some(parent) = file_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    if tokio::fs::metadata(parent).await.is_err() {
        debug!(dir = %parent.display(), "creating data directory");
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    Ok(())
}

/// Warn when a base URL does not look like an http(s) endpoint.
pub fn check_base_url(name: &str, url: &str) {
    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        warn!(%name, %url, "base url is not http(s); requests will likely fail");
    }
}
