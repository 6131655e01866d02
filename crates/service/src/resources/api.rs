use std::marker::PhantomData;

use models::Id;
use reqwest::Method;

use super::Resource;
use crate::errors::ClientError;
use crate::http::ApiClient;

/// REST endpoints of one resource family.
///
/// Listing and creation nest under the project
/// (`/events/{id}/{plural}`); update and delete address the entry directly
/// (`/{plural}/{id}`).
pub struct ResourceApi<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), _resource: PhantomData }
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self { client, _resource: PhantomData }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn endpoint(op: &str) -> String {
        format!("{}.{op}", R::PLURAL)
    }

    fn collection_url(&self, project_id: Id) -> String {
        self.client.transport().url(R::API, &format!("/events/{project_id}/{}", R::PLURAL))
    }

    fn entry_url(&self, id: Id) -> String {
        self.client.transport().url(R::API, &format!("/{}/{id}", R::PLURAL))
    }

    pub async fn list(&self, project_id: Id) -> Result<Vec<R>, ClientError> {
        let fallback = format!("Failed to fetch {}", R::PLURAL);
        let url = self.collection_url(project_id);
        self.client
            .json(Method::GET, url, None::<&()>, &Self::endpoint("list"), &fallback)
            .await
    }

    pub async fn create(&self, project_id: Id, fields: &R::Fields) -> Result<R, ClientError> {
        let fallback = format!("Failed to create {}", R::SINGULAR);
        let url = self.collection_url(project_id);
        self.client
            .json(Method::POST, url, Some(fields), &Self::endpoint("create"), &fallback)
            .await
    }

    pub async fn update(&self, id: Id, patch: &R::Patch) -> Result<R, ClientError> {
        let fallback = format!("Failed to update {}", R::SINGULAR);
        let url = self.entry_url(id);
        self.client
            .json(Method::PUT, url, Some(patch), &Self::endpoint("update"), &fallback)
            .await
    }

    /// Same request as `update` with a status-only body and its own message.
    pub async fn update_status(&self, id: Id, status: R::Status) -> Result<R, ClientError> {
        let fallback = format!("Failed to update {} status", R::SINGULAR);
        let patch = R::status_patch(status);
        let url = self.entry_url(id);
        self.client
            .json(Method::PUT, url, Some(&patch), &Self::endpoint("update"), &fallback)
            .await
    }

    pub async fn delete(&self, id: Id) -> Result<(), ClientError> {
        let fallback = format!("Failed to delete {}", R::SINGULAR);
        let url = self.entry_url(id);
        self.client
            .send(Method::DELETE, url, None::<&()>, &Self::endpoint("delete"), &fallback)
            .await?;
        Ok(())
    }
}
