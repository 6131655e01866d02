//! HTTP plumbing shared by the session manager and the resource clients.
//!
//! `Transport` knows the base URLs and owns the `reqwest` client; it never
//! touches the token. `ApiClient` wraps it with the session: every call reads
//! the current token, fails fast with `AuthError` when there is none, and
//! hands a 401 or 403 back to the session manager before reporting it. The
//! session only ends if the rejected token is still the current one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use configs::ApiConfig;
use models::project::EventDetails;
use models::wire::{ErrorBody, EventEnvelope, EventsEnvelope, UserEnvelope};
use models::{Id, Project, UserProfile};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::errors::AuthError;
use crate::auth::service::AuthSessionManager;
use crate::errors::ClientError;
use crate::metrics::{self, Outcome};

/// Which base URL a path is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    Core,
    Tasks,
    Items,
}

struct Bases {
    core: String,
    tasks: String,
    items: String,
}

#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    bases: Arc<Bases>,
}

impl Transport {
    pub fn new(cfg: &ApiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            bases: Arc::new(Bases {
                core: cfg.base_url.trim_end_matches('/').to_string(),
                tasks: cfg.tasks_base().trim_end_matches('/').to_string(),
                items: cfg.items_base().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Single base URL for every API, no timeout.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            bases: Arc::new(Bases { core: base.clone(), tasks: base.clone(), items: base }),
        }
    }

    pub fn url(&self, api: Api, path: &str) -> String {
        let base = match api {
            Api::Core => &self.bases.core,
            Api::Tasks => &self.bases.tasks,
            Api::Items => &self.bases.items,
        };
        format!("{base}{path}")
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Message from an error body, if the backend sent one.
pub(crate) async fn error_text(resp: Response) -> Option<String> {
    resp.json::<ErrorBody>().await.ok().and_then(|b| b.text().map(str::to_string))
}

/// Authenticated client; cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    session: Arc<AuthSessionManager>,
}

impl ApiClient {
    pub fn new(transport: Transport, session: Arc<AuthSessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<AuthSessionManager> {
        &self.session
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    async fn bearer(&self) -> Result<String, ClientError> {
        match self.session.token() {
            Some(token) => Ok(token),
            None => {
                self.session.invalidate().await;
                Err(AuthError::MissingToken.into())
            }
        }
    }

    /// Send an authenticated request and return the successful response.
    ///
    /// `fallback` is the message reported when the backend gives none.
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
        endpoint: &str,
        fallback: &str,
    ) -> Result<Response, ClientError> {
        let token = self.bearer().await?;
        debug!(%method, %url, %endpoint, "api request");
        let mut req = self.transport.http().request(method, &url).bearer_auth(&token);
        if let Some(body) = body {
            req = req.json(body);
        }

        let started = Instant::now();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics::record_request(endpoint, Outcome::Unreachable, elapsed);
                warn!(%endpoint, error = %e, "backend unreachable");
                return Err(ClientError::fetch(fallback));
            }
        };
        let elapsed = started.elapsed().as_secs_f64();
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            metrics::record_request(endpoint, Outcome::Rejected, elapsed);
            warn!(%endpoint, "token rejected by backend");
            self.session.invalidate_if(&token).await;
            return Err(AuthError::Rejected.into());
        }
        if !status.is_success() {
            metrics::record_request(endpoint, Outcome::Failed, elapsed);
            let message = error_text(resp).await.unwrap_or_else(|| fallback.to_string());
            warn!(%endpoint, status = status.as_u16(), %message, "api request failed");
            return Err(ClientError::Fetch { status: Some(status.as_u16()), message });
        }
        metrics::record_request(endpoint, Outcome::Ok, elapsed);
        Ok(resp)
    }

    /// `send` followed by JSON decoding of the success body.
    pub(crate) async fn json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
        endpoint: &str,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let resp = self.send(method, url, body, endpoint, fallback).await?;
        let status = resp.status().as_u16();
        resp.json::<T>().await.map_err(|e| {
            warn!(%endpoint, error = %e, "undecodable response body");
            ClientError::Fetch { status: Some(status), message: fallback.to_string() }
        })
    }

    /// Events the signed-in user participates in.
    pub async fn my_events(&self) -> Result<Vec<Project>, ClientError> {
        let url = self.transport.url(Api::Core, "/events/my-events");
        let env: EventsEnvelope = self
            .json(Method::GET, url, None::<&()>, "events.mine", "Failed to fetch events")
            .await?;
        Ok(env.events)
    }

    pub async fn event_details(&self, event_id: Id) -> Result<EventDetails, ClientError> {
        let url = self.transport.url(Api::Core, &format!("/events/get-event-id/{event_id}"));
        let env: EventEnvelope = self
            .json(Method::GET, url, None::<&()>, "events.details", "Failed to fetch event details")
            .await?;
        Ok(env.event)
    }

    pub async fn user(&self, user_id: Id) -> Result<UserProfile, ClientError> {
        let url = self.transport.url(Api::Core, &format!("/users/{user_id}"));
        let env: UserEnvelope = self
            .json(Method::GET, url, None::<&()>, "users.get", "Failed to fetch user details")
            .await?;
        Ok(env.user)
    }
}
