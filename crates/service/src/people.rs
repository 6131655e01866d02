use futures::future::try_join_all;
use models::{Id, Person, PersonDraft};
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::http::ApiClient;
use crate::resources::LoadState;

const LOAD_FAILED: &str = "Failed to load participants";

/// Participants of the active project, joined with their user profiles.
///
/// People added locally live only until the next load.
pub struct PeopleDirectory {
    client: ApiClient,
    project_id: Option<Id>,
    people: Vec<Person>,
    state: LoadState,
    banner: Option<String>,
}

impl PeopleDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            project_id: None,
            people: Vec::new(),
            state: LoadState::Loading,
            banner: None,
        }
    }

    pub async fn mount(client: ApiClient, project_id: Option<Id>) -> Self {
        let mut directory = Self::new(client);
        if let Some(id) = project_id {
            if let Err(e) = directory.load(id).await {
                debug!(error = %e, "initial participant load failed");
            }
        }
        directory
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn project_id(&self) -> Option<Id> {
        self.project_id
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Fetch the event's participants and every profile concurrently.
    ///
    /// Any failed request fails the whole load; the previous list of the same
    /// project is kept.
    pub async fn load(&mut self, project_id: Id) -> Result<&[Person], ClientError> {
        if self.project_id != Some(project_id) {
            self.project_id = Some(project_id);
            self.people.clear();
            self.banner = None;
            self.state = LoadState::Loading;
        }

        match self.fetch(project_id).await {
            Ok(people) => {
                debug!(project_id, count = people.len(), "participants loaded");
                self.people = people;
                self.state = LoadState::Ready;
                self.banner = None;
                Ok(&self.people)
            }
            Err(e) => {
                warn!(project_id, error = %e, "participant load failed");
                if self.state == LoadState::Loading {
                    self.state = LoadState::Error;
                }
                if !e.is_auth() {
                    self.banner = Some(LOAD_FAILED.to_string());
                }
                Err(e)
            }
        }
    }

    pub async fn reload(&mut self) -> Result<&[Person], ClientError> {
        let project_id = self.project_id.ok_or(ClientError::NoProject)?;
        self.load(project_id).await
    }

    async fn fetch(&self, project_id: Id) -> Result<Vec<Person>, ClientError> {
        let details = self.client.event_details(project_id).await?;
        let lookups = details.participants.iter().map(|p| self.client.user(p.user_id));
        let profiles = try_join_all(lookups).await?;
        Ok(details
            .participants
            .iter()
            .zip(profiles)
            .map(|(participant, profile)| Person::from_participant(participant, profile))
            .collect())
    }

    /// Append a person to the local list only; the backend is not told.
    ///
    /// Participant ids are user ids, so the local id is numbered past the
    /// highest one in the list.
    pub fn add_person(&mut self, draft: PersonDraft) -> Result<&Person, ClientError> {
        let id = self.people.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let person = draft.into_local(id)?;
        debug!(id, name = %person.name, "person added locally");
        self.people.push(person);
        Ok(&self.people[self.people.len() - 1])
    }
}
