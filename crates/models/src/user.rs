use serde::{Deserialize, Serialize};

use crate::errors::{require, ModelError};
use crate::Id;

/// Identity of the signed-in user, cached next to the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub id: Option<Id>,
    pub email: String,
    /// Display name; falls back to the login email.
    pub name: String,
}

/// Profile returned by `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Id,
    pub username: String,
    pub email: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// User object embedded in auth responses. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthUserPayload {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Token and user carried by a successful login or register reply.
pub trait AuthGrant {
    /// Token field exactly as the endpoint names it.
    fn token_field(&self) -> Option<&str>;
    fn user_payload(&self) -> Option<&AuthUserPayload>;

    /// Non-blank token, if the backend sent one.
    fn token(&self) -> Option<&str> {
        self.token_field().filter(|t| !t.trim().is_empty())
    }

    /// Build the session user, filling gaps from the email used to sign in.
    fn session_user(&self, login_email: &str) -> SessionUser {
        let payload = self.user_payload().cloned().unwrap_or_default();
        let email = payload
            .email
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| login_email.to_string());
        let name = payload
            .name
            .or(payload.username)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| login_email.to_string());
        SessionUser { id: payload.id, email, name }
    }
}

/// Success body of `POST /auth/login`. Only `access_token` counts as a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUserPayload>,
}

impl AuthGrant for LoginResponse {
    fn token_field(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn user_payload(&self) -> Option<&AuthUserPayload> {
        self.user.as_ref()
    }
}

/// Success body of `POST /auth/register`, which names the token `token`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUserPayload>,
}

impl AuthGrant for RegisterResponse {
    fn token_field(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn user_payload(&self) -> Option<&AuthUserPayload> {
        self.user.as_ref()
    }
}

/// Login form state, including the "remember me" toggle.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginInput, ModelError> {
        let email = require("email", &self.email)?;
        if self.password.is_empty() {
            return Err(ModelError::required("password"));
        }
        Ok(LoginInput { email, password: self.password.clone() })
    }
}

/// Registration form state.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agreed_to_terms: bool,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterInput, ModelError> {
        if self.password != self.confirm_password {
            return Err(ModelError::Validation("Passwords do not match".into()));
        }
        if !self.agreed_to_terms {
            return Err(ModelError::Validation("Please agree to the terms and conditions".into()));
        }
        let username = require("username", &self.username)?;
        let email = require("email", &self.email)?;
        if self.password.is_empty() {
            return Err(ModelError::required("password"));
        }
        Ok(RegisterInput { email, password: self.password.clone(), username })
    }
}
