//! # findnews
//!
//! Core of a small news reader: a session store backed by a pluggable identity
//! provider, a news feed fetched from a public JSON endpoint and partitioned
//! into display sections, and a route guard that decides which view a path
//! shows.
//!
//! ## Design Philosophy
//!
//! - **One context object** - [`NewsApp`] is built once and handed to whatever
//!   needs the session or the feed
//! - **Provider-driven** - the identity provider is the only source of truth
//!   for who is signed in; its ambient notifications reach every observer
//! - **Event-driven** - toasts and state transitions are published on a
//!   broadcast channel, so consumers never poll
//! - **Library-first** - the REST API and view models are optional surfaces
//!   over the same stores
//!
//! ## Quick Start
//!
//! ```no_run
//! use findnews::{Config, NewsApp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = NewsApp::new(Config::default()).await?;
//!
//!     // Toasts and state changes
//!     let mut events = app.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     app.session().resolved().await;
//!     app.session().register("reader@example.com", "hunter22").await?;
//!
//!     let count = app.feed().refresh().await?;
//!     let articles = app.feed().state().articles;
//!     let sections = findnews::feed::partition(&articles, "climate");
//!     println!("{count} articles, {} about climate", sections.total_matches);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Application context
pub mod app;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// News feed fetching, state and partitioning
pub mod feed;
/// Identity providers and the gateway in front of them
pub mod identity;
/// Route guard
pub mod routing;
/// Session store
pub mod session;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use app::NewsApp;
pub use config::{Config, IdentityProviderKind};
pub use error::{
    ApiError, Error, ErrorCategory, ErrorDetail, FetchError, ProviderError, Result, ToHttpStatus,
    ValidationError,
};
pub use identity::{FirebaseProvider, IdentityProvider, MemoryIdentityProvider};
pub use routing::{GuardState, Route, RouteDecision, RouteGuard};
pub use types::{
    Article, AuthOperation, Event, FeedState, Identity, NotificationLevel, SessionState,
};

/// Run until a termination signal arrives, then shut the app down.
///
/// Also returns when [`NewsApp::shutdown`] is called from elsewhere.
///
/// - **Unix:** listens for SIGTERM and SIGINT, falling back to whichever could be
///   registered.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use findnews::{Config, NewsApp, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let app = NewsApp::new(Config::default()).await?;
///     let server = app.spawn_api_server();
///
///     // Run with automatic signal handling
///     run_with_shutdown(app).await?;
///     server.await??;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(app: NewsApp) -> Result<()> {
    let token = app.shutdown_token.clone();
    tokio::select! {
        _ = wait_for_signal() => {}
        _ = token.cancelled() => {
            tracing::info!("Shutdown requested by the application");
        }
    }
    app.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
