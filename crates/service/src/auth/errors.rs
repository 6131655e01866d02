use thiserror::Error;

/// Errors of the session workflows.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("not signed in")]
    MissingToken,
    #[error("session expired, please sign in again")]
    Rejected,
    #[error("login response did not include an access token")]
    MissingAccessToken,
    /// Backend message, surfaced verbatim.
    #[error("{0}")]
    LoginFailed(String),
    #[error("Registration failed. Please try again.")]
    RegistrationFailed,
    #[error("{0}")]
    Validation(String),
    #[error("credential storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Missing or rejected tokens end the session; the rest are form errors.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, AuthError::MissingToken | AuthError::Rejected)
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::MissingToken => 1001,
            AuthError::Rejected => 1002,
            AuthError::MissingAccessToken => 1003,
            AuthError::LoginFailed(_) => 1004,
            AuthError::RegistrationFailed => 1005,
            AuthError::Validation(_) => 1006,
            AuthError::Storage(_) => 1100,
        }
    }
}

impl From<crate::errors::StoreError> for AuthError {
    fn from(e: crate::errors::StoreError) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<models::ModelError> for AuthError {
    fn from(e: models::ModelError) -> Self {
        AuthError::Validation(e.to_string())
    }
}
