//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - `views` - Guarded Login, Register and Feed view models
//! - `session` - Sign-in, registration, sign-out
//! - `feed` - Partitioned feed and manual refresh
//! - `system` - Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod feed;
mod session;
mod system;
mod views;

// Re-export all handlers so `routes::function_name` works
pub use feed::*;
pub use session::*;
pub use system::*;
pub use views::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET / and GET /api/feed
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FeedQuery {
    /// Search text; matches title or description, case-insensitively
    #[serde(default)]
    pub q: String,
}

/// Response body for POST /api/feed/refresh
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RefreshResponse {
    /// Number of articles received
    pub count: usize,
}
