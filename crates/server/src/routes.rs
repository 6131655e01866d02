use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;
use crate::{auth, events, resources};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Full router: `/health` at the root, the REST API under `/api`.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register));

    let protected = Router::new()
        .route("/events/my-events", get(events::my_events))
        .route("/events/get-event-id/:id", get(events::event_details))
        .route("/users/:id", get(events::user))
        .route("/events/:id/tasks", get(resources::list_tasks).post(resources::create_task))
        .route("/tasks/:id", put(resources::update_task).delete(resources::delete_task))
        .route("/events/:id/items", get(resources::list_items).post(resources::create_item))
        .route("/items/:id", put(resources::update_item).delete(resources::delete_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer));

    Router::new()
        .route("/health", get(health))
        .nest("/api", public.merge(protected))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
