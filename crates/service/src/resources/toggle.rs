use models::Id;
use tracing::debug;

use super::{Resource, ResourceApi};
use crate::errors::ClientError;

/// Where an optimistic status change stands.
#[derive(Debug, Clone)]
pub enum Phase<R> {
    /// Applied locally, request not sent yet.
    Tentative,
    /// Backend accepted; carries its canonical entry.
    Confirmed(R),
    /// Backend refused or was unreachable.
    Failed(ClientError),
}

/// One optimistic status toggle, stamped with the entry revision it produced.
///
/// Created by `ResourceCollection::begin_status_toggle`, driven by `send`,
/// and handed back to `ResourceCollection::settle`.
#[derive(Debug, Clone)]
pub struct StatusChange<R: Resource> {
    pub id: Id,
    pub previous: R::Status,
    pub target: R::Status,
    pub revision: u64,
    pub phase: Phase<R>,
}

impl<R: Resource> StatusChange<R> {
    pub fn is_settled(&self) -> bool {
        !matches!(self.phase, Phase::Tentative)
    }

    /// Issue the status update. Already settled changes are returned as-is.
    pub async fn send(mut self, api: &ResourceApi<R>) -> Self {
        if self.is_settled() {
            return self;
        }
        debug!(
            kind = R::SINGULAR,
            id = self.id,
            target = ?self.target,
            revision = self.revision,
            "sending status change"
        );
        self.phase = match api.update_status(self.id, self.target).await {
            Ok(entry) => Phase::Confirmed(entry),
            Err(e) => Phase::Failed(e),
        };
        self
    }
}
