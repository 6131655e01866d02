use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use models::project::EventDetails;
use models::wire::{ErrorBody, EventEnvelope, EventsEnvelope, UserEnvelope};
use models::Id;

use crate::auth::CurrentUser;
use crate::errors::ApiError;
use crate::state::AppState;

// Event and user endpoints report failures under `error`.
async fn check(state: &AppState, op: &str) -> Result<(), ApiError> {
    state.check(op).await.map_err(|e| ApiError {
        status: e.status,
        body: ErrorBody { message: None, error: e.body.message },
    })
}

pub async fn my_events(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<EventsEnvelope>, ApiError> {
    check(&state, "events.mine").await?;
    Ok(Json(EventsEnvelope { events: state.events_for(user_id) }))
}

pub async fn event_details(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<EventEnvelope>, ApiError> {
    check(&state, "events.details").await?;
    let event = state
        .event(id)
        .ok_or_else(|| ApiError::error(StatusCode::NOT_FOUND, "Event not found"))?;
    let details = EventDetails { id: Some(event.id), participants: event.participants };
    Ok(Json(EventEnvelope { event: details }))
}

pub async fn user(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<UserEnvelope>, ApiError> {
    check(&state, "users.get").await?;
    let user = state
        .user(id)
        .ok_or_else(|| ApiError::error(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(UserEnvelope { user }))
}
