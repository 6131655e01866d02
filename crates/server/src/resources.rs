//! Task and item endpoints. Both nest under an event for listing and
//! creation and are addressed by their own id afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Id, Item, ItemFields, ItemPatch, ItemStatus, Task, TaskFields, TaskPatch, TaskStatus};
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::state::AppState;

fn require_event(state: &AppState, event_id: Id) -> Result<(), ApiError> {
    match state.event(event_id) {
        Some(_) => Ok(()),
        None => Err(ApiError::message(StatusCode::NOT_FOUND, "Event not found")),
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Path(event_id): Path<Id>,
) -> Result<Json<Vec<Task>>, ApiError> {
    state.check("tasks.list").await?;
    require_event(&state, event_id)?;
    Ok(Json(state.tasks_for(event_id)))
}

pub async fn create_task(
    State(state): State<AppState>,
    Path(event_id): Path<Id>,
    Json(fields): Json<TaskFields>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    state.check("tasks.create").await?;
    require_event(&state, event_id)?;
    let task = state.add_task(event_id, &fields.description, &fields.owner, TaskStatus::Pending);
    tracing::info!(task_id = task.id, event_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    state.check("tasks.update").await?;
    state
        .update_task(id, |task| patch.apply(task))
        .map(Json)
        .ok_or_else(|| ApiError::message(StatusCode::NOT_FOUND, "Task not found"))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    state.check("tasks.delete").await?;
    if !state.delete_task(id) {
        return Err(ApiError::message(StatusCode::NOT_FOUND, "Task not found"));
    }
    Ok(Json(json!({ "message": "Task deleted" })))
}

pub async fn list_items(
    State(state): State<AppState>,
    Path(event_id): Path<Id>,
) -> Result<Json<Vec<Item>>, ApiError> {
    state.check("items.list").await?;
    require_event(&state, event_id)?;
    Ok(Json(state.items_for(event_id)))
}

pub async fn create_item(
    State(state): State<AppState>,
    Path(event_id): Path<Id>,
    Json(fields): Json<ItemFields>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    state.check("items.create").await?;
    require_event(&state, event_id)?;
    let item = state.add_item(
        event_id,
        &fields.name,
        fields.quantity,
        fields.price,
        &fields.owner,
        ItemStatus::Pending,
    );
    tracing::info!(item_id = item.id, event_id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Id>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, ApiError> {
    state.check("items.update").await?;
    state
        .update_item(id, |item| patch.apply(item))
        .map(Json)
        .ok_or_else(|| ApiError::message(StatusCode::NOT_FOUND, "Item not found"))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<Json<Value>, ApiError> {
    state.check("items.delete").await?;
    if !state.delete_item(id) {
        return Err(ApiError::message(StatusCode::NOT_FOUND, "Item not found"));
    }
    Ok(Json(json!({ "message": "Item deleted" })))
}
