use std::sync::Mutex;

use tracing::info;

/// Views the session manager can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// Side effect fired on every session transition.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator for headless frontends: only records the transition in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        info!(route = route.path(), "navigate");
    }
}

/// Keeps every navigation in order; used by embedders that poll for the
/// current view.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().copied())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        info!(route = route.path(), "navigate");
        if let Ok(mut h) = self.history.lock() {
            h.push(route);
        }
    }
}
