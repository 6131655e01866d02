use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::time::{Duration, Instant};

use axum::Router;
use serde_json::{json, Value};
use tower::Service;

use server::seed::{seed_demo, DEMO_EMAIL, DEMO_PASSWORD};
use server::startup::build_app;
use server::AppState;

fn build() -> (AppState, Router) {
    let state = AppState::new();
    seed_demo(&state);
    let app = build_app(state.clone());
    (state, app)
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    Ok(builder.body(Body::from(serde_json::to_vec(&body)?))?)
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn login(app: &mut Router) -> anyhow::Result<String> {
    let credentials = json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD});
    let req = json_request("POST", "/api/auth/login", None, credentials)?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    Ok(body["access_token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn login_returns_access_token_and_user() -> anyhow::Result<()> {
    let (_state, mut app) = build();
    let credentials = json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD});
    let req = json_request("POST", "/api/auth/login", None, credentials)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], DEMO_EMAIL);
    assert_eq!(body["user"]["name"], "demo");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_401_with_message() -> anyhow::Result<()> {
    let (_state, mut app) = build();
    let credentials = json!({"email": DEMO_EMAIL, "password": "nope"});
    let req = json_request("POST", "/api/auth/login", None, credentials)?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await?["message"], "Invalid email or password");
    Ok(())
}

#[tokio::test]
async fn register_names_the_token_field_token() -> anyhow::Result<()> {
    let (_state, mut app) = build();
    let body = json!({"email": "new@example.com", "password": "pw", "username": "newbie"});
    let req = json_request("POST", "/api/auth/register", None, body.clone())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = body_json(resp).await?;
    assert!(created["token"].as_str().is_some());
    assert_eq!(created["user"]["username"], "newbie");

    let resp = app.call(json_request("POST", "/api/auth/register", None, body)?).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_known_bearer_token() -> anyhow::Result<()> {
    let (state, mut app) = build();
    let req = Request::builder().uri("/api/events/my-events").body(Body::empty())?;
    assert_eq!(app.clone().call(req).await?.status(), StatusCode::UNAUTHORIZED);

    let token = login(&mut app).await?;
    let req = Request::builder()
        .uri("/api/events/my-events")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let events = body_json(resp).await?;
    assert_eq!(events["events"].as_array().map(Vec::len), Some(2));
    assert_eq!(events["events"][0]["title"], "Launch Party");

    state.revoke_tokens();
    let req = Request::builder()
        .uri("/api/events/my-events")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    assert_eq!(app.call(req).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn task_lifecycle() -> anyhow::Result<()> {
    let (state, mut app) = build();
    let token = login(&mut app).await?;
    let event_id = state.events_for(1)[0].id;

    let req = json_request(
        "POST",
        &format!("/api/events/{event_id}/tasks"),
        Some(&token),
        json!({"description": "Hire a DJ", "owner": "sam"}),
    )?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task = body_json(resp).await?;
    assert_eq!(task["status"], "Pending");
    let id = task["id"].as_i64().unwrap_or_default();

    let patch = json!({"status": "In Progress"});
    let req = json_request("PUT", &format!("/api/tasks/{id}"), Some(&token), patch)?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await?;
    assert_eq!(updated["status"], "In Progress");
    assert_eq!(updated["description"], "Hire a DJ");

    let req = json_request("DELETE", &format!("/api/tasks/{id}"), Some(&token), json!({}))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.task(id).is_none());

    let req = json_request("DELETE", &format!("/api/tasks/{id}"), Some(&token), json!({}))?;
    assert_eq!(app.call(req).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn faults_fire_once_and_are_counted() -> anyhow::Result<()> {
    let (state, mut app) = build();
    let token = login(&mut app).await?;
    state.fail_next("events.mine", StatusCode::INTERNAL_SERVER_ERROR, Some("database down"));

    let get = || {
        Request::builder()
            .uri("/api/events/my-events")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
    };
    let resp = app.clone().call(get()?).await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await?["error"], "database down");

    assert_eq!(app.call(get()?).await?.status(), StatusCode::OK);
    assert_eq!(state.hits("events.mine"), 2);
    Ok(())
}

#[tokio::test]
async fn swapped_token_field_moves_the_login_token() -> anyhow::Result<()> {
    let (state, mut app) = build();
    state.swap_token_field_next("auth.login");
    let credentials = json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD});
    let resp = app.call(json_request("POST", "/api/auth/login", None, credentials)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert!(body.get("access_token").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn delayed_fault_holds_the_reply_back() -> anyhow::Result<()> {
    let (state, mut app) = build();
    let token = login(&mut app).await?;
    let delay = Duration::from_millis(150);
    state.fail_next_after("events.mine", StatusCode::UNAUTHORIZED, None, delay);

    let req = Request::builder()
        .uri("/api/events/my-events")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let started = Instant::now();
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(started.elapsed() >= Duration::from_millis(150));
    Ok(())
}
