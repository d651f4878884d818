//! Route gate for the console views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every view asks the gate before rendering, with the session's current
//! `authenticated` flag. The decision is recomputed per navigation and per
//! session change; nothing here caches.

use std::fmt;

/// Where signed-out callers are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where signed-in callers land when their request has no better target.
pub const HOME_PATH: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Home,
    Customers,
    Bills,
    Reports,
}

impl Route {
    pub const ALL: [Self; 6] = [Self::Landing, Self::Login, Self::Home, Self::Customers, Self::Bills, Self::Reports];

    /// Match a request path. Query strings, fragments, and one trailing slash
    /// are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };
        let path = if path.is_empty() { HOME_PATH } else { path };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Landing => "/welcome",
            Self::Login => LOGIN_PATH,
            Self::Home => HOME_PATH,
            Self::Customers => "/customers",
            Self::Bills => "/bills",
            Self::Reports => "/reports",
        }
    }

    /// Reachable without a session.
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Landing | Self::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Render(Route),
    Redirect(Route),
}

impl GateDecision {
    /// The route that ends up on screen.
    #[must_use]
    pub fn target(self) -> Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => route,
        }
    }
}

/// Decide what `path` shows for a caller whose session is (or is not) live.
#[must_use]
pub fn gate(authenticated: bool, path: &str) -> GateDecision {
    let requested = Route::from_path(path);
    if authenticated {
        match requested {
            Some(Route::Login) | None => GateDecision::Redirect(Route::Home),
            Some(route) => GateDecision::Render(route),
        }
    } else {
        match requested {
            Some(route) if route.is_public() => GateDecision::Render(route),
            _ => GateDecision::Redirect(Route::Login),
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
