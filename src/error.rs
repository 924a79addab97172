//! Error types for findnews
//!
//! This module provides the error handling for the library, including:
//! - The user-facing [`ErrorCategory`] taxonomy shared by the session and feed layers
//! - Domain-specific error types (validation, feed fetching, identity provider)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for findnews operations
pub type Result<T> = std::result::Result<T, Error>;

/// User-facing error categories
///
/// Every failure that reaches the presentation layer is reduced to one of these.
/// Provider-specific codes and transport errors never leak past the session and
/// feed stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Email/password pair rejected by the identity provider
    InvalidCredentials,
    /// Registration attempted with an email that already has an account
    EmailAlreadyInUse,
    /// Email address rejected as malformed
    InvalidEmail,
    /// Password rejected as too weak by the provider
    WeakPassword,
    /// News feed could not be fetched or decoded
    FetchFailed,
    /// Anything else
    Unknown,
}

impl ErrorCategory {
    /// Machine-readable code, identical to the serde representation
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidCredentials => "invalid_credentials",
            ErrorCategory::EmailAlreadyInUse => "email_already_in_use",
            ErrorCategory::InvalidEmail => "invalid_email",
            ErrorCategory::WeakPassword => "weak_password",
            ErrorCategory::FetchFailed => "fetch_failed",
            ErrorCategory::Unknown => "unknown",
        }
    }

    /// Message shown to the user in a toast or error panel
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidCredentials => {
                "Login failed. Please check your credentials and try again."
            }
            ErrorCategory::EmailAlreadyInUse => {
                "This email is already registered. Please try logging in instead."
            }
            ErrorCategory::InvalidEmail => {
                "Invalid email address. Please check your email and try again."
            }
            ErrorCategory::WeakPassword => {
                "Password is too weak. Please choose a stronger password."
            }
            ErrorCategory::FetchFailed => "Failed to fetch news. Please try again later.",
            ErrorCategory::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Main error type for findnews
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed.url")
        key: Option<String>,
    },

    /// Identity provider rejected an authentication operation
    #[error("authentication failed: {0}")]
    Auth(ErrorCategory),

    /// Form input rejected locally, before any provider call
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Another authentication operation is still in flight
    #[error("an authentication operation is already in progress")]
    AuthInProgress,

    /// Operation requires a signed-in identity
    #[error("not signed in")]
    Unauthenticated,

    /// The initial identity check has not completed yet
    #[error("session is still being resolved")]
    SessionPending,

    /// News feed fetch failed
    #[error("feed error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress
    #[error("shutdown in progress")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Reduce this error to the category shown to users
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth(category) => *category,
            Error::Fetch(_) => ErrorCategory::FetchFailed,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// Client-side form validation errors
///
/// These are raised before the identity provider is contacted, so they never
/// cost a network round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required form field is empty
    #[error("{field} is required")]
    MissingField {
        /// Name of the empty field
        field: &'static str,
    },

    /// Password and confirmation differ
    #[error("Password mismatch. Please make sure your passwords match.")]
    PasswordMismatch,

    /// Password shorter than the configured minimum
    #[error("Password must be at least {min} characters long.")]
    PasswordTooShort {
        /// Minimum accepted length, in characters
        min: usize,
    },
}

/// News feed fetch errors
///
/// All variants map to [`ErrorCategory::FetchFailed`]; the distinction only
/// matters for logs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Feed endpoint answered with a non-2xx status
    #[error("feed returned HTTP {status}: {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Body was not the expected JSON shape
    #[error("malformed feed payload: {0}")]
    Decode(String),

    /// Fetch task ended without producing an outcome
    #[error("feed fetch task aborted")]
    Aborted,
}

/// Error reported by an identity provider
///
/// `code` uses the provider's `auth/<kebab-case>` vocabulary
/// (e.g. `auth/email-already-in-use`); the gateway maps it to an
/// [`ErrorCategory`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    /// Provider error code
    pub code: String,
    /// Provider supplied detail, for logs only
    pub message: String,
}

impl ProviderError {
    /// Create a provider error from a code and a detail message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Transport failure talking to the provider
    pub fn network(message: impl Into<String>) -> Self {
        Self::new("auth/network-request-failed", message)
    }

    /// Map the provider code to the user-facing category
    pub fn category(&self) -> ErrorCategory {
        match self.code.as_str() {
            "auth/invalid-credential"
            | "auth/invalid-login-credentials"
            | "auth/wrong-password"
            | "auth/user-not-found" => ErrorCategory::InvalidCredentials,
            "auth/email-already-in-use" => ErrorCategory::EmailAlreadyInUse,
            "auth/invalid-email" => ErrorCategory::InvalidEmail,
            "auth/weak-password" => ErrorCategory::WeakPassword,
            _ => ErrorCategory::Unknown,
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_credentials",
///     "message": "authentication failed: invalid_credentials",
///     "details": {
///       "category": "invalid_credentials",
///       "user_message": "Login failed. Please check your credentials and try again."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_credentials", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }

    /// Create a "service unavailable" error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new("service_unavailable", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 401 - provider said no, or no session
            Error::Auth(ErrorCategory::InvalidCredentials) => 401,
            Error::Unauthenticated => 401,

            // 409 Conflict
            Error::Auth(ErrorCategory::EmailAlreadyInUse) => 409,
            Error::AuthInProgress => 409,

            // 422 Unprocessable Entity - provider rejected the input itself
            Error::Auth(ErrorCategory::InvalidEmail) => 422,
            Error::Auth(ErrorCategory::WeakPassword) => 422,

            // 502 Bad Gateway - upstream failures
            Error::Auth(ErrorCategory::FetchFailed | ErrorCategory::Unknown) => 502,
            Error::Fetch(_) => 502,

            // 503 Service Unavailable
            Error::SessionPending => 503,
            Error::ShuttingDown => 503,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Auth(category) => category.code(),
            Error::Validation(_) => "validation_error",
            Error::AuthInProgress => "auth_in_progress",
            Error::Unauthenticated => "unauthorized",
            Error::SessionPending => "session_pending",
            Error::Fetch(_) => "fetch_failed",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Auth(category) => Some(serde_json::json!({
                "category": category,
                "user_message": category.user_message(),
            })),
            Error::Validation(e) => Some(serde_json::json!({
                "user_message": e.to_string(),
            })),
            Error::Fetch(_) => Some(serde_json::json!({
                "category": ErrorCategory::FetchFailed,
                "user_message": ErrorCategory::FetchFailed.user_message(),
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        }
    }
}
