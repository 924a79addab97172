//! Session handlers: current state, sign-in, registration, sign-out.

use crate::api::AppState;
use crate::error::Error;
use crate::session::{LoginForm, RegistrationForm};
use crate::types::SessionState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

/// GET /api/session - Current session state
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "session",
    responses(
        (status = 200, description = "Current session", body = SessionState)
    )
)]
pub async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.app.session().state())
}

/// POST /api/session/login - Email/password sign-in
#[utoipa::path(
    post,
    path = "/api/session/login",
    tag = "session",
    request_body = LoginForm,
    responses(
        (status = 200, description = "Signed in", body = SessionState),
        (status = 400, description = "Missing email or password", body = crate::error::ApiError),
        (status = 401, description = "Credentials rejected", body = crate::error::ApiError),
        (status = 409, description = "Another action is in progress", body = crate::error::ApiError)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, Error> {
    let session = state.app.session();
    session.login(&form.email, &form.password).await?;
    Ok(Json(session.state()))
}

/// POST /api/session/register - Account creation
#[utoipa::path(
    post,
    path = "/api/session/register",
    tag = "session",
    request_body = RegistrationForm,
    responses(
        (status = 201, description = "Account created and signed in", body = SessionState),
        (status = 400, description = "Form rejected before reaching the provider", body = crate::error::ApiError),
        (status = 409, description = "Email already registered, or another action is in progress", body = crate::error::ApiError),
        (status = 422, description = "Provider rejected the email or password", body = crate::error::ApiError)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, Error> {
    let session = state.app.session();
    session.register_form(&form).await?;
    Ok((StatusCode::CREATED, Json(session.state())))
}

/// POST /api/session/google - Social sign-in
#[utoipa::path(
    post,
    path = "/api/session/google",
    tag = "session",
    responses(
        (status = 200, description = "Signed in", body = SessionState),
        (status = 409, description = "Another action is in progress", body = crate::error::ApiError),
        (status = 502, description = "Provider sign-in failed", body = crate::error::ApiError)
    )
)]
pub async fn login_with_google(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let session = state.app.session();
    session.login_with_provider().await?;
    Ok(Json(session.state()))
}

/// POST /api/session/logout - Sign out
#[utoipa::path(
    post,
    path = "/api/session/logout",
    tag = "session",
    responses(
        (status = 200, description = "Signed out", body = SessionState),
        (status = 401, description = "Not signed in", body = crate::error::ApiError),
        (status = 503, description = "Session still resolving", body = crate::error::ApiError)
    )
)]
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let session = state.app.session();
    session.logout().await?;
    Ok(Json(session.state()))
}
