//! Feed handlers

use super::{FeedQuery, RefreshResponse};
use crate::api::AppState;
use crate::api::routes::FeedView;
use crate::error::Error;
use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;

/// GET /api/feed - Partitioned feed for the signed-in user
#[utoipa::path(
    get,
    path = "/api/feed",
    tag = "feed",
    params(
        ("q" = Option<String>, Query, description = "Search text matched against title and description")
    ),
    responses(
        (status = 200, description = "Feed sections, or an error panel when the last fetch failed", body = FeedView),
        (status = 401, description = "Not signed in", body = crate::error::ApiError),
        (status = 503, description = "Session still resolving", body = crate::error::ApiError)
    )
)]
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> impl IntoResponse {
    let app = &state.app;
    app.feed().ensure_loaded();

    Json(FeedView::build(
        &app.session().state(),
        &app.feed().state(),
        query.q,
        Utc::now(),
    ))
}

/// POST /api/feed/refresh - Fetch the feed again
#[utoipa::path(
    post,
    path = "/api/feed/refresh",
    tag = "feed",
    responses(
        (status = 200, description = "Feed fetched", body = RefreshResponse),
        (status = 401, description = "Not signed in", body = crate::error::ApiError),
        (status = 502, description = "Feed could not be fetched", body = crate::error::ApiError)
    )
)]
pub async fn refresh_feed(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let count = state.app.feed().refresh().await?;
    Ok(Json(RefreshResponse { count }))
}
