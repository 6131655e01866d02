//! Dashboard shell: project selection plus one mounted tab.
//!
//! Only session-ending errors leave the shell. Failures inside a tab stay in
//! that tab's banner.

use models::{Id, Item, Project, Task};
use tracing::{debug, info, warn};

use crate::errors::ClientError;
use crate::http::ApiClient;
use crate::people::PeopleDirectory;
use crate::resources::{LoadState, ResourceCollection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Tasks,
    Items,
    People,
    Description,
}

/// The mounted tab and the state it owns.
pub enum TabView {
    Tasks(ResourceCollection<Task>),
    Items(ResourceCollection<Item>),
    People(PeopleDirectory),
    Description,
}

impl TabView {
    pub fn tab(&self) -> Tab {
        match self {
            TabView::Tasks(_) => Tab::Tasks,
            TabView::Items(_) => Tab::Items,
            TabView::People(_) => Tab::People,
            TabView::Description => Tab::Description,
        }
    }
}

// Keep session-ending errors, swallow the rest (they live in the tab banner).
fn contain<T>(result: Result<T, ClientError>) -> Result<(), ClientError> {
    match result {
        Err(e) if e.is_auth() => Err(e),
        _ => Ok(()),
    }
}

pub struct Dashboard {
    client: ApiClient,
    projects: Vec<Project>,
    active: Option<Id>,
    description: String,
    view: TabView,
    state: LoadState,
    banner: Option<String>,
}

impl Dashboard {
    /// Guard the session, fetch projects, select the first one and mount the
    /// default tab.
    pub async fn mount(client: ApiClient) -> Result<Self, ClientError> {
        client.session().require_session().await?;

        let mut dashboard = Self {
            view: TabView::Tasks(ResourceCollection::new(client.clone())),
            client,
            projects: Vec::new(),
            active: None,
            description: String::new(),
            state: LoadState::Loading,
            banner: None,
        };
        dashboard.refresh_projects().await?;
        dashboard.set_tab(Tab::default()).await?;
        Ok(dashboard)
    }

    /// Re-fetch the project list; keeps the selection when it still exists.
    pub async fn refresh_projects(&mut self) -> Result<(), ClientError> {
        match self.client.my_events().await {
            Ok(projects) => {
                info!(count = projects.len(), "projects loaded");
                self.projects = projects;
                self.state = LoadState::Ready;
                self.banner = None;
            }
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                warn!(error = %e, "project fetch failed");
                self.projects.clear();
                self.state = LoadState::Error;
                self.banner = Some(e.to_string());
            }
        }

        let still_there = self.active.and_then(|id| self.projects.iter().find(|p| p.id == id));
        match still_there.or_else(|| self.projects.first()) {
            Some(project) => {
                if self.active != Some(project.id) {
                    self.active = Some(project.id);
                    self.description = project.description.clone();
                }
            }
            None => {
                self.active = None;
                self.description.clear();
            }
        }
        Ok(())
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.active?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// The project list loaded fine and is empty.
    pub fn no_projects(&self) -> bool {
        self.state == LoadState::Ready && self.projects.is_empty()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Local edit of the active project's description; not sent anywhere.
    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), ClientError> {
        let id = self.active.ok_or(ClientError::NoProject)?;
        let text = text.into();
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.description = text.clone();
        }
        self.description = text;
        Ok(())
    }

    /// Switch project: re-seed the description and let the mounted tab
    /// fetch for the new id.
    pub async fn select_project(&mut self, project_id: Id) -> Result<(), ClientError> {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or(ClientError::UnknownEntry { kind: "project", id: project_id })?;
        debug!(project_id, "project selected");
        self.description = project.description.clone();
        self.active = Some(project_id);

        match &mut self.view {
            TabView::Tasks(c) => contain(c.set_project(project_id).await),
            TabView::Items(c) => contain(c.set_project(project_id).await),
            TabView::People(p) => contain(p.load(project_id).await),
            TabView::Description => Ok(()),
        }
    }

    pub fn tab(&self) -> Tab {
        self.view.tab()
    }

    /// Mount a fresh view for `tab`; data tabs always fetch.
    pub async fn set_tab(&mut self, tab: Tab) -> Result<(), ClientError> {
        debug!(?tab, project_id = ?self.active, "mounting tab");
        let client = self.client.clone();
        let (view, result) = match (tab, self.active) {
            (Tab::Tasks, Some(id)) => {
                let mut c = ResourceCollection::new(client);
                let r = contain(c.set_project(id).await);
                (TabView::Tasks(c), r)
            }
            (Tab::Items, Some(id)) => {
                let mut c = ResourceCollection::new(client);
                let r = contain(c.set_project(id).await);
                (TabView::Items(c), r)
            }
            (Tab::People, Some(id)) => {
                let mut p = PeopleDirectory::new(client);
                let r = contain(p.load(id).await);
                (TabView::People(p), r)
            }
            (Tab::Tasks, None) => (TabView::Tasks(ResourceCollection::new(client)), Ok(())),
            (Tab::Items, None) => (TabView::Items(ResourceCollection::new(client)), Ok(())),
            (Tab::People, None) => (TabView::People(PeopleDirectory::new(client)), Ok(())),
            (Tab::Description, _) => (TabView::Description, Ok(())),
        };
        self.view = view;
        result
    }

    pub fn view(&self) -> &TabView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TabView {
        &mut self.view
    }

    pub fn tasks_mut(&mut self) -> Option<&mut ResourceCollection<Task>> {
        match &mut self.view {
            TabView::Tasks(c) => Some(c),
            _ => None,
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut ResourceCollection<Item>> {
        match &mut self.view {
            TabView::Items(c) => Some(c),
            _ => None,
        }
    }

    pub fn people_mut(&mut self) -> Option<&mut PeopleDirectory> {
        match &mut self.view {
            TabView::People(p) => Some(p),
            _ => None,
        }
    }
}
