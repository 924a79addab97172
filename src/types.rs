//! Core types for findnews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ErrorCategory;

/// Signed-in user as reported by the identity provider
///
/// The provider owns the identity; the session store only keeps a read-only copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Provider-assigned unique id
    pub uid: String,
    /// Email address, when the provider exposes one
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity from a uid and an email
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: Some(email.into()),
        }
    }
}

/// A single news article
///
/// Articles have no key beyond their position in the feed. Duplicates are kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Article {
    /// Headline
    pub title: String,
    /// Teaser text
    pub description: Option<String>,
    /// Link to the full story
    pub url: String,
    /// Lead image
    pub image_url: Option<String>,
    /// Publication time
    pub published_at: DateTime<Utc>,
    /// Byline
    pub author: Option<String>,
    /// Publishing outlet
    pub source_name: String,
}

/// Ambient sign-in state pushed by the identity provider
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not finished its initial check
    #[default]
    Pending,
    /// A user is signed in
    SignedIn(Identity),
    /// Nobody is signed in
    SignedOut,
}

impl AuthState {
    /// The signed-in identity, if any
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }

    /// Whether the provider has finished its initial check
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Pending)
    }
}

/// Session state held by the [`SessionStore`](crate::session::SessionStore)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionState {
    /// Current identity (None = signed out)
    pub identity: Option<Identity>,
    /// True only while an authentication operation is in flight
    pub is_loading: bool,
    /// Category of the last failed operation
    pub last_error: Option<ErrorCategory>,
    /// False until the provider's initial identity check has been observed
    pub resolved: bool,
}

impl SessionState {
    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Feed state held by the [`FeedStore`](crate::feed::FeedStore)
#[derive(Clone, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct FeedState {
    /// Articles from the last successful fetch, in feed order
    pub articles: Vec<Article>,
    /// True while a fetch is in flight
    pub is_loading: bool,
    /// Category of the last failed fetch
    pub error: Option<ErrorCategory>,
    /// When the last successful fetch completed
    pub last_fetched: Option<DateTime<Utc>>,
}

impl FeedState {
    /// True until the first fetch has been started
    pub fn is_idle(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.last_fetched.is_none()
    }
}

/// Authentication operation kinds, used in events and logs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthOperation {
    /// Email/password sign-in
    Login,
    /// Account creation
    Register,
    /// Social (Google) sign-in
    ProviderLogin,
    /// Sign-out
    Logout,
}

/// Toast severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// Event emitted by the session and feed stores
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An authentication operation started
    SessionLoading {
        /// Which operation
        operation: AuthOperation,
    },

    /// A user signed in (explicitly or via ambient notification)
    SignedIn {
        /// The signed-in identity
        identity: Identity,
    },

    /// The session ended (explicit logout or provider-side sign-out)
    SignedOut,

    /// An authentication operation failed
    AuthFailed {
        /// Which operation
        operation: AuthOperation,
        /// Failure category
        category: ErrorCategory,
    },

    /// A feed fetch started
    FeedLoading,

    /// A feed fetch completed
    FeedLoaded {
        /// Number of articles received
        count: usize,
    },

    /// A feed fetch failed
    FeedFailed {
        /// Failure category
        category: ErrorCategory,
    },

    /// Transient user notification (toast)
    Notification {
        /// Severity
        level: NotificationLevel,
        /// Text shown to the user
        message: String,
    },

    /// Application is shutting down
    Shutdown,
}

impl Event {
    /// Event name used for the SSE `event:` field
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionLoading { .. } => "session_loading",
            Event::SignedIn { .. } => "signed_in",
            Event::SignedOut => "signed_out",
            Event::AuthFailed { .. } => "auth_failed",
            Event::FeedLoading => "feed_loading",
            Event::FeedLoaded { .. } => "feed_loaded",
            Event::FeedFailed { .. } => "feed_failed",
            Event::Notification { .. } => "notification",
            Event::Shutdown => "shutdown",
        }
    }

    pub(crate) fn success(message: impl Into<String>) -> Self {
        Event::Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Event::Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}
