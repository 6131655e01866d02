//! Envelopes and error bodies of the REST contract.

use serde::{Deserialize, Serialize};

use crate::project::{EventDetails, Project};
use crate::user::UserProfile;

/// Error payload returned on non-success responses.
///
/// Auth and resource endpoints use `message`; event and user endpoints use
/// `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(msg: impl Into<String>) -> Self {
        Self { message: Some(msg.into()), error: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self { message: None, error: Some(msg.into()) }
    }

    /// First non-blank message the backend provided.
    pub fn text(&self) -> Option<&str> {
        [self.message.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsEnvelope {
    #[serde(default)]
    pub events: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: EventDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserProfile,
}
