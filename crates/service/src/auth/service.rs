use std::sync::Arc;

use arc_swap::ArcSwap;
use models::user::{
    AuthGrant, LoginForm, LoginInput, LoginResponse, RegisterForm, RegisterInput, RegisterResponse,
};
use models::SessionUser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::domain::Session;
use super::errors::AuthError;
use crate::credentials::{CredentialKey, CredentialStore};
use crate::errors::StoreError;
use crate::http::{error_text, Api, Transport};
use crate::metrics;
use crate::navigation::{Navigator, Route};

/// Owns the token and user identity.
///
/// Every present/absent transition of the token goes through `establish` or
/// `clear`, which write durable storage first, then swap the in-memory
/// snapshot, then navigate. The user profile is written before the token, so
/// a stored token always has its profile next to it.
pub struct AuthSessionManager {
    transport: Transport,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    session: ArcSwap<Session>,
    transition: Mutex<()>,
}

impl AuthSessionManager {
    /// Rehydrate the session from durable storage.
    ///
    /// A cached user that no longer parses is dropped; the token is kept.
    pub async fn restore(
        transport: Transport,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let token = store.get(CredentialKey::Token).await.filter(|t| !t.is_empty());
        let user = match store.get(CredentialKey::User).await {
            Some(raw) => match serde_json::from_str::<SessionUser>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "cached user profile unreadable; ignoring");
                    None
                }
            },
            None => None,
        };
        debug!(authenticated = token.is_some(), "session restored");
        Arc::new(Self {
            transport,
            store,
            navigator,
            session: ArcSwap::from_pointee(Session { token, user }),
            transition: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<Session> {
        self.session.load_full()
    }

    pub fn token(&self) -> Option<String> {
        self.session.load().token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.session.load().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.load().is_authenticated()
    }

    /// Guard for protected views: without a token, go to the login view.
    pub async fn require_session(&self) -> Result<Arc<Session>, AuthError> {
        let snap = self.snapshot();
        if snap.is_authenticated() {
            return Ok(snap);
        }
        self.navigator.navigate(Route::Login);
        Err(AuthError::MissingToken)
    }

    /// Sign in with email and password.
    ///
    /// On failure the backend's message is returned as-is and the session is
    /// left untouched. A success body without `access_token` persists nothing
    /// and does not navigate.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        let input = LoginInput { email: email.to_string(), password: password.to_string() };
        let resp: LoginResponse = self
            .post_auth("/auth/login", &input)
            .await
            .map_err(|msg| AuthError::LoginFailed(msg.unwrap_or_else(|| "Login failed".into())))?;

        let token = resp.token().ok_or(AuthError::MissingAccessToken)?.to_string();
        let user = resp.session_user(email);
        self.establish(token, user.clone()).await?;
        info!(user_id = ?user.id, "user_logged_in");
        Ok(user)
    }

    /// Login form submit: update the remembered email, then sign in.
    pub async fn login_with(&self, form: &LoginForm) -> Result<SessionUser, AuthError> {
        let input = form.validate()?;
        if form.remember_me {
            self.remember_email(Some(&input.email)).await;
        } else {
            self.remember_email(None).await;
        }
        self.login(&input.email, &input.password).await
    }

    /// Prefill for the login form from the remembered email.
    pub async fn login_form_defaults(&self) -> LoginForm {
        match self.store.get(CredentialKey::RememberedEmail).await {
            Some(email) if !email.is_empty() => {
                LoginForm { email, password: String::new(), remember_me: true }
            }
            _ => LoginForm::default(),
        }
    }

    /// Store or forget the login email. Best effort: failures are only logged.
    pub async fn remember_email(&self, email: Option<&str>) {
        let result = match email {
            Some(email) => self.store.set(CredentialKey::RememberedEmail, email.to_string()).await,
            None => self.store.remove(CredentialKey::RememberedEmail).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "could not update remembered email");
        }
    }

    /// Create an account and sign in with it.
    ///
    /// Backend messages are not surfaced; every failure reads
    /// "Registration failed. Please try again.".
    #[instrument(skip(self, password), fields(email = %email, username = %username))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<SessionUser, AuthError> {
        let input = RegisterInput {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        };
        let resp: RegisterResponse = self.post_auth("/auth/register", &input).await.map_err(|msg| {
            debug!(backend_message = ?msg, "registration rejected");
            AuthError::RegistrationFailed
        })?;

        let token = resp.token().ok_or(AuthError::MissingAccessToken)?.to_string();
        let user = resp.session_user(email);
        self.establish(token, user.clone()).await?;
        info!(user_id = ?user.id, "user_registered");
        Ok(user)
    }

    /// Register form submit: local checks first, then `register`.
    pub async fn register_with(&self, form: &RegisterForm) -> Result<SessionUser, AuthError> {
        let input = form.validate()?;
        self.register(&input.email, &input.password, &input.username).await
    }

    /// Clear the session everywhere and go to the login view.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.clear("logout", None).await
    }

    /// Same effects as `logout`, used when the backend rejects the token or a
    /// protected call finds none. Storage failures are logged, not returned.
    pub async fn invalidate(&self) {
        if let Err(e) = self.clear("invalidated", None).await {
            warn!(error = %e, "session cleared in memory but not on disk");
        }
    }

    /// `invalidate` for a backend rejection of `token`.
    ///
    /// Requests finish in any order, so a rejection that arrives after the
    /// user signed in again names a token that is already gone; the newer
    /// session is kept.
    pub async fn invalidate_if(&self, token: &str) {
        if let Err(e) = self.clear("invalidated", Some(token)).await {
            warn!(error = %e, "session cleared in memory but not on disk");
        }
    }

    /// Edit the cached profile of the signed-in user and persist it.
    pub async fn update_user<F>(&self, edit: F) -> Result<Option<SessionUser>, AuthError>
    where
        F: FnOnce(&mut SessionUser),
    {
        let _guard = self.transition.lock().await;
        let current = self.snapshot();
        let Some(mut user) = current.user.clone() else {
            return Ok(None);
        };
        edit(&mut user);
        let user_json = serde_json::to_string(&user).map_err(StoreError::from)?;
        self.store.set(CredentialKey::User, user_json).await?;
        let next = Session { token: current.token.clone(), user: Some(user.clone()) };
        self.session.store(Arc::new(next));
        Ok(Some(user))
    }

    async fn post_auth<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, Option<String>> {
        let url = self.transport.url(Api::Core, path);
        let resp = match self.transport.http().post(&url).json(body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%url, error = %e, "auth endpoint unreachable");
                return Err(None);
            }
        };
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = error_text(resp).await;
            debug!(status, ?message, "auth request failed");
            return Err(message);
        }
        resp.json::<R>().await.map_err(|e| {
            warn!(error = %e, "undecodable auth response");
            None
        })
    }

    async fn establish(&self, token: String, user: SessionUser) -> Result<(), AuthError> {
        let _guard = self.transition.lock().await;
        let previous = self.snapshot();
        let user_json = serde_json::to_string(&user).map_err(StoreError::from)?;
        self.store.set(CredentialKey::User, user_json).await?;
        if let Err(e) = self.store.set(CredentialKey::Token, token.clone()).await {
            self.put_back_user(previous.user.as_ref()).await;
            return Err(e.into());
        }
        self.session.store(Arc::new(Session { token: Some(token), user: Some(user) }));
        metrics::record_transition("established");
        self.navigator.navigate(Route::Dashboard);
        Ok(())
    }

    /// Undo a profile write whose token write failed.
    async fn put_back_user(&self, user: Option<&SessionUser>) {
        let result = match user.map(serde_json::to_string) {
            Some(Ok(json)) => self.store.set(CredentialKey::User, json).await,
            Some(Err(e)) => Err(StoreError::from(e)),
            None => self.store.remove(CredentialKey::User).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "could not restore the cached user profile");
        }
    }

    /// Memory is cleared and navigation fires even when storage fails, so the
    /// view never shows protected content without a token.
    ///
    /// With `rejected` set, nothing happens unless that is the current token.
    async fn clear(&self, kind: &str, rejected: Option<&str>) -> Result<(), AuthError> {
        let _guard = self.transition.lock().await;
        if let Some(rejected) = rejected {
            if self.session.load().token.as_deref() != Some(rejected) {
                debug!(%kind, "rejection of a replaced token ignored");
                return Ok(());
            }
        }
        let token_removed = self.store.remove(CredentialKey::Token).await;
        let user_removed = self.store.remove(CredentialKey::User).await;
        self.session.store(Arc::new(Session::default()));
        metrics::record_transition(kind);
        info!(%kind, "session cleared");
        self.navigator.navigate(Route::Login);
        token_removed?;
        user_removed?;
        Ok(())
    }
}
