mod support;

use std::sync::Arc;
use std::time::Duration;

use models::user::{LoginForm, RegisterForm};
use reqwest::StatusCode;
use service::auth::errors::AuthError;
use service::credentials::CredentialKey;
use service::navigation::{RecordingNavigator, Route};
use service::ClientError;

use support::{harness, signed_in, FailingWrites, EMAIL, PASSWORD};

#[tokio::test]
async fn login_persists_token_and_user_then_navigates() -> anyhow::Result<()> {
    let h = harness().await?;
    let user = h.session().login(EMAIL, PASSWORD).await?;

    assert_eq!(user.id, Some(h.demo));
    assert_eq!(user.name, "demo");
    assert!(h.session().is_authenticated());
    assert!(h.stored(CredentialKey::Token).await.is_some());
    let cached = h.stored(CredentialKey::User).await.unwrap_or_default();
    assert!(cached.contains(EMAIL));
    assert_eq!(h.navigator.history(), vec![Route::Dashboard]);
    Ok(())
}

#[tokio::test]
async fn login_failure_surfaces_backend_message() -> anyhow::Result<()> {
    let h = harness().await?;
    let err = h.session().login(EMAIL, "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(!h.session().is_authenticated());
    assert!(h.stored(CredentialKey::Token).await.is_none());
    assert!(h.navigator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_failure_without_message_uses_generic_text() -> anyhow::Result<()> {
    let h = harness().await?;
    h.state.fail_next("auth.login", StatusCode::INTERNAL_SERVER_ERROR, None);
    let err = h.session().login(EMAIL, PASSWORD).await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed");
    Ok(())
}

#[tokio::test]
async fn login_without_access_token_persists_nothing() -> anyhow::Result<()> {
    let h = harness().await?;
    h.state.omit_token_next("auth.login");
    let err = h.session().login(EMAIL, PASSWORD).await.unwrap_err();

    assert!(matches!(err, AuthError::MissingAccessToken));
    assert!(h.stored(CredentialKey::Token).await.is_none());
    assert!(h.stored(CredentialKey::User).await.is_none());
    assert!(!h.session().is_authenticated());
    assert!(h.navigator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_reply_naming_the_token_field_token_persists_nothing() -> anyhow::Result<()> {
    let h = harness().await?;
    h.state.swap_token_field_next("auth.login");
    let err = h.session().login(EMAIL, PASSWORD).await.unwrap_err();

    assert!(matches!(err, AuthError::MissingAccessToken));
    assert!(h.stored(CredentialKey::Token).await.is_none());
    assert!(!h.session().is_authenticated());
    assert!(h.navigator.history().is_empty());
    Ok(())
}

#[tokio::test]
async fn register_signs_in_with_the_token_field() -> anyhow::Result<()> {
    let h = harness().await?;
    let user = h.session().register("new@example.com", "pw", "newbie").await?;

    assert_eq!(user.name, "newbie");
    assert!(h.session().is_authenticated());
    assert_eq!(h.navigator.current(), Some(Route::Dashboard));
    Ok(())
}

#[tokio::test]
async fn register_failure_is_always_generic() -> anyhow::Result<()> {
    let h = harness().await?;
    let err = h.session().register(EMAIL, "pw", "dup").await.unwrap_err();

    assert_eq!(err.to_string(), "Registration failed. Please try again.");
    assert!(!h.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn register_form_checks_run_before_any_request() -> anyhow::Result<()> {
    let h = harness().await?;
    let form = RegisterForm {
        username: "x".into(),
        email: "x@example.com".into(),
        password: "one".into(),
        confirm_password: "two".into(),
        agreed_to_terms: true,
    };
    let err = h.session().register_with(&form).await.unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");

    let form = RegisterForm { confirm_password: "one".into(), agreed_to_terms: false, ..form };
    let err = h.session().register_with(&form).await.unwrap_err();
    assert_eq!(err.to_string(), "Please agree to the terms and conditions");

    assert_eq!(h.state.hits("auth.register"), 0);
    Ok(())
}

#[tokio::test]
async fn remember_me_controls_the_login_prefill() -> anyhow::Result<()> {
    let h = harness().await?;
    let form = LoginForm { email: EMAIL.into(), password: PASSWORD.into(), remember_me: true };
    h.session().login_with(&form).await?;
    let defaults = h.session().login_form_defaults().await;
    assert_eq!(defaults.email, EMAIL);
    assert!(defaults.remember_me);

    let form = LoginForm { remember_me: false, ..form };
    h.session().login_with(&form).await?;
    let defaults = h.session().login_form_defaults().await;
    assert!(defaults.email.is_empty());
    assert!(h.stored(CredentialKey::RememberedEmail).await.is_none());
    Ok(())
}

#[tokio::test]
async fn logout_clears_storage_memory_and_navigates() -> anyhow::Result<()> {
    let h = signed_in().await?;
    h.session().remember_email(Some(EMAIL)).await;
    h.session().logout().await?;

    assert!(!h.session().is_authenticated());
    assert!(h.session().user().is_none());
    assert!(h.stored(CredentialKey::Token).await.is_none());
    assert!(h.stored(CredentialKey::User).await.is_none());
    // The remembered email outlives the session.
    assert_eq!(h.stored(CredentialKey::RememberedEmail).await.as_deref(), Some(EMAIL));
    assert_eq!(h.navigator.current(), Some(Route::Login));
    Ok(())
}

#[tokio::test]
async fn session_survives_a_restart() -> anyhow::Result<()> {
    let h = signed_in().await?;
    let client = h.reopen().await?;

    assert!(client.session().is_authenticated());
    assert_eq!(client.session().user().map(|u| u.email), Some(EMAIL.to_string()));
    assert_eq!(client.my_events().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn rejected_token_ends_the_session() -> anyhow::Result<()> {
    let h = signed_in().await?;
    h.state.revoke_tokens();

    let err = h.client.my_events().await.unwrap_err();
    assert!(err.is_auth());
    assert!(matches!(err, ClientError::Auth(AuthError::Rejected)));
    assert!(!h.session().is_authenticated());
    assert!(h.stored(CredentialKey::Token).await.is_none());
    assert_eq!(h.navigator.current(), Some(Route::Login));
    Ok(())
}

#[tokio::test]
async fn forbidden_is_treated_as_rejection() -> anyhow::Result<()> {
    let h = signed_in().await?;
    h.state.fail_next("events.mine", StatusCode::FORBIDDEN, Some("forbidden"));

    let err = h.client.my_events().await.unwrap_err();
    assert!(err.is_auth());
    assert!(!h.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn missing_token_fails_before_the_network() -> anyhow::Result<()> {
    let h = harness().await?;
    let err = h.client.my_events().await.unwrap_err();

    assert!(matches!(err, ClientError::Auth(AuthError::MissingToken)));
    assert_eq!(h.state.hits("events.mine"), 0);
    assert_eq!(h.navigator.current(), Some(Route::Login));
    Ok(())
}

#[tokio::test]
async fn require_session_redirects_when_signed_out() -> anyhow::Result<()> {
    let h = harness().await?;
    assert!(h.session().require_session().await.is_err());
    assert_eq!(h.navigator.current(), Some(Route::Login));

    let h = signed_in().await?;
    let snap = h.session().require_session().await?;
    assert!(snap.token.is_some());
    Ok(())
}

#[tokio::test]
async fn update_user_rewrites_the_cached_profile() -> anyhow::Result<()> {
    let h = signed_in().await?;
    let updated = h.session().update_user(|u| u.name = "Demo Organizer".into()).await?;
    assert_eq!(updated.map(|u| u.name), Some("Demo Organizer".to_string()));

    let client = h.reopen().await?;
    assert_eq!(client.session().user().map(|u| u.name), Some("Demo Organizer".to_string()));
    Ok(())
}

#[tokio::test]
async fn late_rejection_of_a_replaced_token_keeps_the_new_session() -> anyhow::Result<()> {
    let h = signed_in().await?;
    let old = h.session().token();
    let delay = Duration::from_millis(300);
    h.state.fail_next_after("events.mine", StatusCode::UNAUTHORIZED, None, delay);

    let relogin = async {
        while h.state.hits("events.mine") == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        h.session().login(EMAIL, PASSWORD).await
    };
    let (stale, relogged) = tokio::join!(h.client.my_events(), relogin);
    relogged?;

    let fresh = h.session().token();
    assert!(fresh.is_some());
    assert_ne!(fresh, old);
    assert!(matches!(stale, Err(ClientError::Auth(AuthError::Rejected))));
    assert_eq!(h.stored(CredentialKey::Token).await, fresh);
    assert_eq!(h.navigator.current(), Some(Route::Dashboard));

    // A rejection of the current token still ends the session.
    h.state.revoke_tokens();
    assert!(h.client.my_events().await.is_err());
    assert!(!h.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn failed_profile_write_leaves_no_token_behind() -> anyhow::Result<()> {
    let h = harness().await?;
    let store = FailingWrites::over(h.store.clone());
    store.refuse(Some(CredentialKey::User));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = h.client_over(store, navigator.clone()).await;

    let err = client.session().login(EMAIL, PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::Storage(_)));
    assert!(!client.session().is_authenticated());
    assert!(navigator.history().is_empty());
    assert!(h.stored(CredentialKey::Token).await.is_none());

    let restarted = h.reopen().await?;
    assert!(!restarted.session().is_authenticated());
    assert!(restarted.session().user().is_none());
    Ok(())
}

#[tokio::test]
async fn failed_token_write_restores_the_previous_profile() -> anyhow::Result<()> {
    let h = harness().await?;
    let store = FailingWrites::over(h.store.clone());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = h.client_over(store.clone(), navigator.clone()).await;

    store.refuse(Some(CredentialKey::Token));
    assert!(client.session().login(EMAIL, PASSWORD).await.is_err());
    assert!(h.stored(CredentialKey::User).await.is_none());
    assert!(navigator.history().is_empty());

    store.refuse(None);
    client.session().login(EMAIL, PASSWORD).await?;
    let before = h.stored(CredentialKey::User).await;

    store.refuse(Some(CredentialKey::Token));
    assert!(client.session().register("other@example.com", "pw", "other").await.is_err());
    assert_eq!(h.stored(CredentialKey::User).await, before);
    assert_eq!(client.session().user().map(|u| u.email), Some(EMAIL.to_string()));
    Ok(())
}
