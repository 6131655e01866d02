use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use models::user::{LoginInput, RegisterInput};
use models::Id;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::state::{failure, AppState, Fault};

/// Id of the caller, inserted by `require_bearer`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Id);

/// How a successful auth reply carries its token.
enum TokenField {
    Regular,
    Omitted,
    Swapped,
}

async fn auth_fault(state: &AppState, op: &str) -> Result<TokenField, ApiError> {
    match state.enter(op) {
        Some(Fault::Fail { status, message, after }) => Err(failure(status, message, after).await),
        Some(Fault::OmitToken) => Ok(TokenField::Omitted),
        Some(Fault::SwapTokenField) => Ok(TokenField::Swapped),
        None => Ok(TokenField::Regular),
    }
}

fn attach_token(
    body: &mut Value,
    mode: TokenField,
    field: &str,
    other: &str,
    issue: impl FnOnce() -> String,
) {
    let key = match mode {
        TokenField::Regular => field,
        TokenField::Swapped => other,
        TokenField::Omitted => return,
    };
    body[key] = Value::String(issue());
}

/// `POST /auth/login`: `{access_token, user: {id, email, name}}`.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiError> {
    let mode = auth_fault(&state, "auth.login").await?;
    let user = state
        .find_user_by_email(input.email.trim())
        .filter(|u| u.password == input.password)
        .ok_or_else(|| {
            tracing::warn!(email = %input.email, "login rejected");
            ApiError::message(StatusCode::UNAUTHORIZED, "Invalid email or password")
        })?;

    let id = user.profile.id;
    tracing::info!(user_id = id, "login");
    let mut body = json!({
        "user": { "id": id, "email": user.profile.email, "name": user.profile.username }
    });
    attach_token(&mut body, mode, "access_token", "token", || state.issue_token(id));
    Ok(Json(body))
}

/// `POST /auth/register`: `{token, user: {id, email, username}}`.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<Value>, ApiError> {
    let mode = auth_fault(&state, "auth.register").await?;
    let (email, username) = (input.email.trim(), input.username.trim());
    if email.is_empty() || username.is_empty() || input.password.is_empty() {
        return Err(ApiError::message(
            StatusCode::BAD_REQUEST,
            "email, username and password are required",
        ));
    }
    if state.find_user_by_email(email).is_some() {
        return Err(ApiError::message(StatusCode::CONFLICT, "User already exists"));
    }

    let id = state.add_user(email, &input.password, username);
    tracing::info!(user_id = id, "registered");
    let mut body = json!({
        "user": { "id": id, "email": email, "username": username }
    });
    attach_token(&mut body, mode, "token", "access_token", || state.issue_token(id));
    Ok(Json(body))
}

/// Checks `Authorization: Bearer <token>`; anything else is a 401.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")).map(str::trim) else {
        tracing::warn!(%path, "missing bearer token");
        return Err(ApiError::unauthorized());
    };
    let Some(user_id) = state.user_for_token(token) else {
        tracing::warn!(%path, "unknown bearer token");
        return Err(ApiError::unauthorized());
    };
    req.extensions_mut().insert(CurrentUser(user_id));
    Ok(next.run(req).await)
}
