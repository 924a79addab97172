//! HTTP error response handling for the API
//!
//! Converts domain errors to HTTP responses with status codes from
//! [`ToHttpStatus`] and JSON error bodies.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Implement IntoResponse for Error to automatically convert errors to HTTP responses
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::warn!(error = %self, status = status_code.as_u16(), "Request failed");
        }

        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}

/// Implement IntoResponse for ApiError for explicit error responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Errors with a known status go through Error::into_response
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, FetchError, ValidationError};

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn invalid_credentials_is_401_with_user_message() {
        let response = Error::Auth(ErrorCategory::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "invalid_credentials");
        assert_eq!(
            api_error.error.details.unwrap()["user_message"],
            "Login failed. Please check your credentials and try again."
        );
    }

    #[tokio::test]
    async fn validation_is_400() {
        let response = Error::Validation(ValidationError::PasswordMismatch).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error.code, "validation_error");
    }

    #[tokio::test]
    async fn fetch_failure_is_502() {
        let response = Error::Fetch(FetchError::Decode("eof".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "fetch_failed");
        assert_eq!(
            api_error.error.details.unwrap()["user_message"],
            "Failed to fetch news. Please try again later."
        );
    }

    #[tokio::test]
    async fn bare_api_error_is_500() {
        let response = ApiError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
