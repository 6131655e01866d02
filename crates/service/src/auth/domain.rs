use models::SessionUser;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the session.
///
/// A present token only means the user signed in at some point; the backend
/// revalidates it on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
