//! Session middleware for the REST API
//!
//! Protected routes run only for a signed-in user. While the identity provider
//! has not reported in the answer is 503, so clients retry instead of treating
//! the user as signed out.

use crate::api::AppState;
use crate::error::Error;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Middleware admitting requests only when a user is signed in
///
/// Returns:
/// - 503 `session_pending` while the session is unresolved
/// - 401 `unauthorized` when nobody is signed in
/// - otherwise the next handler's response, with the signed-in
///   [`Identity`](crate::types::Identity) available as a request extension
///
/// # Examples
///
/// ```no_run
/// use axum::{Router, middleware, routing::get};
/// use findnews::api::{AppState, auth::require_session};
///
/// # fn build(state: AppState) -> Router {
/// Router::new()
///     .route("/private", get(|| async { "ok" }))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_session))
///     .with_state(state)
/// # }
/// ```
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = state.app.session().state();

    if !session.resolved {
        return Error::SessionPending.into_response();
    }

    match session.identity {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => Error::Unauthenticated.into_response(),
    }
}
