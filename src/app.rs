//! Application context
//!
//! [`NewsApp`] wires the identity provider, session store, feed store and event
//! bus together once at startup. Everything else borrows from it.

use crate::config::{Config, IdentityProviderKind};
use crate::error::Result;
use crate::feed::{FeedFetcher, FeedStore};
use crate::identity::{FirebaseProvider, IdentityGateway, IdentityProvider, MemoryIdentityProvider};
use crate::routing::RouteGuard;
use crate::session::SessionStore;
use crate::types::Event;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// News reader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct NewsApp {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Who is signed in
    pub(crate) session: Arc<SessionStore>,
    /// Latest articles
    pub(crate) feed: Arc<FeedStore>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Cancelled on shutdown; stops the API server
    pub(crate) shutdown_token: CancellationToken,
    /// Set by the first [`shutdown`](Self::shutdown) call
    shutdown_started: Arc<AtomicBool>,
    gateway: IdentityGateway,
}

impl NewsApp {
    /// Create an instance using the provider selected in `config.identity`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid settings, such as
    /// the Firebase provider without an API key.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let provider: Arc<dyn IdentityProvider> = match config.identity.provider {
            IdentityProviderKind::Memory => Arc::new(MemoryIdentityProvider::new()),
            IdentityProviderKind::Firebase => Arc::new(FirebaseProvider::new(&config.identity)?),
        };

        Self::with_provider(config, provider).await
    }

    /// Create an instance around an already built identity provider
    ///
    /// The session store starts following the provider immediately and the
    /// provider's initial check runs in the background, so the session is
    /// unresolved for a short while after this returns.
    pub async fn with_provider(config: Config, provider: Arc<dyn IdentityProvider>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let gateway = IdentityGateway::new(provider);

        let session = Arc::new(SessionStore::new(
            gateway.clone(),
            event_tx.clone(),
            config.identity.min_password_length,
        ));
        session.attach();

        let feed = Arc::new(FeedStore::new(
            FeedFetcher::new(&config.feed)?,
            event_tx.clone(),
        ));

        let restore_gateway = gateway.clone();
        tokio::spawn(async move {
            if let Err(category) = restore_gateway.restore().await {
                tracing::warn!(%category, "Starting signed out");
            }
        });

        tracing::info!(
            provider = gateway.provider_name(),
            feed_url = %config.feed.url,
            "findnews initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            session,
            feed,
            event_tx,
            shutdown_token: CancellationToken::new(),
            shutdown_started: Arc::new(AtomicBool::new(false)),
            gateway,
        })
    }

    /// Subscribe to session, feed and notification events
    ///
    /// Slow receivers lose the oldest events (`RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Configuration this instance was built with
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Session store
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Feed store
    pub fn feed(&self) -> &Arc<FeedStore> {
        &self.feed
    }

    /// Route guard for the current session snapshot
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::from_session(&self.session.state())
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Start the REST API server in a background task
    ///
    /// The server stops when [`shutdown`](Self::shutdown) is called.
    pub fn spawn_api_server(&self) -> JoinHandle<Result<()>> {
        let app = self.clone();
        tokio::spawn(async move { crate::api::start_api_server(app).await })
    }

    /// Shut down: stop the API server, release the provider subscription and
    /// stop provider background work
    ///
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shutdown_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Initiating graceful shutdown");

        self.shutdown_token.cancel();
        self.session.detach();
        self.gateway.shutdown().await;

        self.event_tx.send(Event::Shutdown).ok();
        tracing::info!("Graceful shutdown complete");
        Ok(())
    }
}
