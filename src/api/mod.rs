//! REST API server module
//!
//! Serves the Login, Register and Feed view models, the session and feed
//! actions behind them, and a server-sent events stream of toasts and state
//! changes.

use crate::{NewsApp, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Views (route guard applies)
/// - `GET /` - Feed view (`?q=` filters articles)
/// - `GET /login` - Login view
/// - `GET /register` - Register view
/// - any other path - redirected by the guard
///
/// ## Session
/// - `GET /api/session` - Current session state
/// - `POST /api/session/login` - Email/password sign-in
/// - `POST /api/session/register` - Account creation
/// - `POST /api/session/google` - Social sign-in
/// - `POST /api/session/logout` - Sign out (signed in only)
///
/// ## Feed (signed in only)
/// - `GET /api/feed` - Partitioned feed (`?q=` filters articles)
/// - `POST /api/feed/refresh` - Fetch the feed again
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /api/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(app: NewsApp) -> Router {
    let config = app.config().clone();
    let state = AppState::new(app);

    // Routes that need a signed-in user
    let protected = Router::new()
        .route("/api/feed", get(routes::get_feed))
        .route("/api/feed/refresh", post(routes::refresh_feed))
        .route("/api/session/logout", post(routes::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let router = Router::new()
        // Views
        .route("/", get(routes::render_view))
        .route("/login", get(routes::render_view))
        .route("/register", get(routes::render_view))
        // Session
        .route("/api/session", get(routes::get_session))
        .route("/api/session/login", post(routes::login))
        .route("/api/session/register", post(routes::register))
        .route("/api/session/google", post(routes::login_with_google))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec))
        .route("/api/events", get(routes::event_stream))
        .merge(protected)
        .fallback(routes::fallback);

    // Swagger UI serves its own copy of the document under a distinct path
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until [`NewsApp::shutdown`] is called, then finishes in-flight requests
/// and returns.
///
/// # Example
///
/// ```no_run
/// use findnews::{Config, NewsApp};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = NewsApp::new(Config::default()).await?;
///
/// // Start API server (blocks until shutdown)
/// findnews::api::start_api_server(app).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(app: NewsApp) -> Result<()> {
    let bind_address = app.config().server.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    serve(listener, app).await
}

/// Serve the API on an already bound listener
///
/// Useful when the caller picks the port (e.g. `127.0.0.1:0` in tests).
pub async fn serve(listener: TcpListener, app: NewsApp) -> Result<()> {
    let shutdown = app.shutdown_token.clone();
    let address = listener
        .local_addr()
        .map_err(crate::error::Error::Io)?;
    let router = create_router(app);

    tracing::info!(address = %address, "API server listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
