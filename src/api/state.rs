//! Application state for the API server

use crate::{Config, NewsApp};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// The application instance
    pub app: NewsApp,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(app: NewsApp) -> Self {
        let config = app.config().clone();
        Self { app, config }
    }
}
