//! Route guard
//!
//! Decides which view a path resolves to from the session state alone. While the
//! identity provider has not reported in, every path resolves to a loading
//! placeholder so no protected view flashes before a redirect.

use crate::types::SessionState;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

/// Application views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/`
    Feed,
}

impl Route {
    /// Canonical path
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Feed => "/",
        }
    }

    /// Route for a path; unknown paths give `None`
    ///
    /// A trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Feed),
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            _ => None,
        }
    }

    fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }
}

/// What the guard knows about the session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Waiting for the provider's first notification
    #[default]
    Resolving,
    /// A user is signed in
    Authenticated,
    /// Nobody is signed in
    Unauthenticated,
}

impl GuardState {
    /// Classify a session snapshot
    pub fn of(session: &SessionState) -> Self {
        if !session.resolved {
            GuardState::Resolving
        } else if session.is_authenticated() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }
}

/// Outcome of resolving a path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show the loading placeholder
    Pending,
    /// Show this view
    Admit(Route),
    /// Send the user to this view instead
    Redirect(Route),
}

/// Maps paths to views according to the current session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    state: GuardState,
}

impl RouteGuard {
    /// Guard in the resolving state
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard reflecting a session snapshot
    pub fn from_session(session: &SessionState) -> Self {
        Self {
            state: GuardState::of(session),
        }
    }

    /// Current guard state
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Apply a new session snapshot; returns whether the state changed
    pub fn observe(&mut self, session: &SessionState) -> bool {
        let next = GuardState::of(session);
        if next == self.state {
            return false;
        }
        debug!(from = ?self.state, to = ?next, "Route guard transition");
        self.state = next;
        true
    }

    /// Decide what `path` shows
    pub fn resolve(&self, path: &str) -> RouteDecision {
        let route = Route::from_path(path);
        match (self.state, route) {
            (GuardState::Resolving, _) => RouteDecision::Pending,
            (GuardState::Authenticated, Some(Route::Feed)) => RouteDecision::Admit(Route::Feed),
            (GuardState::Authenticated, _) => RouteDecision::Redirect(Route::Feed),
            (GuardState::Unauthenticated, Some(route)) if route.is_public() => {
                RouteDecision::Admit(route)
            }
            (GuardState::Unauthenticated, _) => RouteDecision::Redirect(Route::Login),
        }
    }
}
