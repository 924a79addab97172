//! View handlers: every page path goes through the route guard.

use super::FeedQuery;
use crate::api::AppState;
use crate::error::{ApiError, ErrorCategory};
use crate::feed::{ArticleView, Section, Sections, partition};
use crate::routing::{Route, RouteDecision};
use crate::types::{FeedState, Identity, SessionState};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Where the retry button of the error panel posts to
const RETRY_ACTION: &str = "/api/feed/refresh";

/// Which view a response carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Placeholder shown until the session resolves
    Loading,
    /// Sign-in form
    Login,
    /// Account creation form
    Register,
    /// News feed
    Feed,
}

impl From<Route> for ViewKind {
    fn from(route: Route) -> Self {
        match route {
            Route::Login => ViewKind::Login,
            Route::Register => ViewKind::Register,
            Route::Feed => ViewKind::Feed,
        }
    }
}

/// Loading placeholder
#[derive(Debug, Serialize, ToSchema)]
pub struct LoadingView {
    /// Always `loading`
    pub view: ViewKind,
}

/// Login or Register form state
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthView {
    /// `login` or `register`
    pub view: ViewKind,
    /// Submit buttons are disabled while true
    pub is_loading: bool,
    /// Category of the last failed action
    pub last_error: Option<ErrorCategory>,
    /// Minimum password length enforced by the register form
    pub min_password_length: usize,
    /// Path of the other form ("Create an account" / "Sign in")
    pub switch_to: String,
}

/// Error panel that replaces the feed sections
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedErrorPanel {
    /// Failure category
    pub category: ErrorCategory,
    /// Text shown in the panel
    pub message: String,
    /// Endpoint the retry button posts to
    pub retry: String,
}

/// The five feed sections, rendered for display
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct SectionsView {
    /// Lead story
    pub featured: Option<ArticleView>,
    /// Breaking news strip
    pub breaking: Vec<ArticleView>,
    /// Main grid
    pub main: Vec<ArticleView>,
    /// Sidebar list
    pub sidebar: Vec<ArticleView>,
    /// Trending list
    pub trending: Vec<ArticleView>,
}

impl SectionsView {
    fn render(sections: &Sections<'_>, now: DateTime<Utc>) -> Self {
        let render_all = |section: Section| -> Vec<ArticleView> {
            sections
                .section(section)
                .iter()
                .map(|a| ArticleView::render(a, now))
                .collect()
        };

        Self {
            featured: sections.featured.map(|a| ArticleView::render(a, now)),
            breaking: render_all(Section::Breaking),
            main: render_all(Section::Main),
            sidebar: render_all(Section::Sidebar),
            trending: render_all(Section::Trending),
        }
    }
}

/// Feed page
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedView {
    /// Always `feed`
    pub view: ViewKind,
    /// Signed-in user
    pub identity: Option<Identity>,
    /// Search text the sections were filtered with
    pub query: String,
    /// True while a fetch is in flight
    pub is_loading: bool,
    /// Present when the last fetch failed; sections are omitted then
    pub error: Option<FeedErrorPanel>,
    /// Filtered and partitioned articles
    pub sections: Option<SectionsView>,
    /// Articles matching the query, including those past the last section
    pub total_matches: usize,
    /// When the feed was last fetched successfully
    pub last_fetched: Option<DateTime<Utc>>,
}

impl FeedView {
    /// Build the feed view from store snapshots
    pub fn build(
        session: &SessionState,
        feed: &FeedState,
        query: String,
        now: DateTime<Utc>,
    ) -> Self {
        let (error, sections, total_matches) = match feed.error {
            Some(category) => (
                Some(FeedErrorPanel {
                    category,
                    message: category.user_message().to_string(),
                    retry: RETRY_ACTION.to_string(),
                }),
                None,
                0,
            ),
            None => {
                let sections = partition(&feed.articles, &query);
                (
                    None,
                    Some(SectionsView::render(&sections, now)),
                    sections.total_matches,
                )
            }
        };

        Self {
            view: ViewKind::Feed,
            identity: session.identity.clone(),
            query,
            is_loading: feed.is_loading,
            error,
            sections,
            total_matches,
            last_fetched: feed.last_fetched,
        }
    }
}

/// Admit, redirect or hold `path` according to the current session
fn guarded(state: &AppState, path: &str, query: FeedQuery) -> Response {
    let app = &state.app;
    let session = app.session().state();

    match app.route_guard().resolve(path) {
        RouteDecision::Pending => (
            StatusCode::ACCEPTED,
            Json(LoadingView {
                view: ViewKind::Loading,
            }),
        )
            .into_response(),
        RouteDecision::Redirect(route) => Redirect::to(route.path()).into_response(),
        RouteDecision::Admit(Route::Feed) => {
            // first visit starts the fetch
            app.feed().ensure_loaded();
            let view = FeedView::build(&session, &app.feed().state(), query.q, Utc::now());
            Json(view).into_response()
        }
        RouteDecision::Admit(route) => {
            let switch_to = match route {
                Route::Login => Route::Register.path(),
                _ => Route::Login.path(),
            };
            Json(AuthView {
                view: route.into(),
                is_loading: session.is_loading,
                last_error: session.last_error,
                min_password_length: app.session().min_password_length(),
                switch_to: switch_to.to_string(),
            })
            .into_response()
        }
    }
}

/// GET /, /login, /register - Guarded view models
#[utoipa::path(
    get,
    path = "/",
    tag = "views",
    params(
        ("q" = Option<String>, Query, description = "Search text matched against title and description")
    ),
    responses(
        (status = 200, description = "Admitted view (feed, login or register)", body = FeedView),
        (status = 202, description = "Session still resolving", body = LoadingView),
        (status = 303, description = "Redirect to the view the session allows")
    )
)]
pub async fn render_view(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<FeedQuery>,
) -> Response {
    guarded(&state, uri.path(), query)
}

/// Fallback for unknown paths
///
/// Unknown API paths get a 404 JSON error; any other path is handed to the
/// guard, which redirects it.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                "not_found",
                format!("no endpoint at {}", uri.path()),
            )),
        )
            .into_response();
    }
    guarded(&state, uri.path(), FeedQuery::default())
}
