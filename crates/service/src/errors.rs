use models::{Id, ModelError};
use thiserror::Error;

use crate::auth::errors::AuthError;

/// Failure of the durable credential store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

/// Error surfaced by any backend-facing operation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Missing or rejected token; the session has already been cleared.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Non-success response or unreachable backend.
    #[error("{message}")]
    Fetch { status: Option<u16>, message: String },
    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ModelError),
    #[error("{kind} {id} is not in the current list")]
    UnknownEntry { kind: &'static str, id: Id },
    #[error("no project selected")]
    NoProject,
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ClientError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch { status: None, message: message.into() }
    }

    /// True when the error must end the session instead of showing a banner.
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(e) if e.invalidates_session())
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ClientError::Auth(e) => e.code(),
            ClientError::Fetch { .. } => 2001,
            ClientError::Validation(_) => 2002,
            ClientError::UnknownEntry { .. } => 2003,
            ClientError::NoProject => 2004,
            ClientError::Storage(_) => 2100,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serde(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
