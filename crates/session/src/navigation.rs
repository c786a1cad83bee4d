//! Navigation hooks fired after login and logout

use crate::config::SessionConfig;

/// Landing route selected by a session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Authenticated,
    Unauthenticated,
}

impl Route {
    /// Path configured for this route
    pub fn path<'a>(&self, config: &'a SessionConfig) -> &'a str {
        match self {
            Route::Authenticated => &config.authenticated_route,
            Route::Unauthenticated => &config.unauthenticated_route,
        }
    }
}

/// Router collaborator. Fire-and-forget: the session never waits on it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only records the request in the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "Navigating");
    }
}
