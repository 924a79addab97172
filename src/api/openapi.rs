//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the findnews REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the findnews REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "findnews REST API",
        version = "0.1.0",
        description = "Session, feed and view-model endpoints of the findnews news reader",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        // Views
        crate::api::routes::render_view,

        // Session
        crate::api::routes::get_session,
        crate::api::routes::login,
        crate::api::routes::register,
        crate::api::routes::login_with_google,
        crate::api::routes::logout,

        // Feed
        crate::api::routes::get_feed,
        crate::api::routes::refresh_feed,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(
        schemas(
            // Views
            crate::api::routes::ViewKind,
            crate::api::routes::LoadingView,
            crate::api::routes::AuthView,
            crate::api::routes::FeedView,
            crate::api::routes::FeedErrorPanel,
            crate::api::routes::SectionsView,
            crate::feed::ArticleView,
            crate::routing::Route,
            crate::routing::GuardState,

            // Session
            crate::session::LoginForm,
            crate::session::RegistrationForm,
            crate::types::SessionState,
            crate::types::Identity,

            // Feed
            crate::api::routes::FeedQuery,
            crate::api::routes::RefreshResponse,
            crate::types::Article,
            crate::types::FeedState,

            // Events
            crate::types::Event,
            crate::types::AuthOperation,
            crate::types::NotificationLevel,

            // Errors
            crate::error::ErrorCategory,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "views", description = "Guarded Login, Register and Feed view models"),
        (name = "session", description = "Sign-in, registration and sign-out"),
        (name = "feed", description = "News feed access"),
        (name = "system", description = "Health check, events and API documentation")
    )
)]
pub struct ApiDoc;
