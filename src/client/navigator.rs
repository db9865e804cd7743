//! Application navigation triggered from the client layer.

use std::sync::Mutex;

use tracing::warn;

use crate::util::lock::mutex_lock;

const SOURCE: &str = "client::navigator";

/// Entry points the client layer may force the application to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
        }
    }
}

/// Receives forced navigation, e.g. the redirect to login after a 401.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Reports redirects through the log; used by the command-line front end,
/// where "navigating to login" means asking the user to log in again.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn redirect(&self, route: Route) {
        warn!(route = route.path(), "session ended; run `inkpost login` to continue");
    }
}

/// Keeps every redirect in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        mutex_lock(&self.history, SOURCE, "history").clone()
    }

    pub fn last(&self) -> Option<Route> {
        mutex_lock(&self.history, SOURCE, "last").last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        mutex_lock(&self.history, SOURCE, "redirect").push(route);
    }
}
