//! Identity provider boundary.
//!
//! Authentication is delegated entirely to an external identity provider. This
//! module defines the seam ([`IdentityProvider`]), the thin pass-through the
//! session store talks to ([`IdentityGateway`]), and two implementations:
//!
//! - [`FirebaseProvider`] - Firebase Authentication over its REST API
//! - [`MemoryIdentityProvider`] - local accounts kept in memory
//!
//! Providers push their sign-in state through a `watch` channel. The gateway turns
//! that into an explicit subscription with an unsubscribe handle.

use crate::error::{ErrorCategory, ProviderError};
use crate::types::{AuthOperation, AuthState, Identity};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod credentials;
mod firebase;
mod memory;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use credentials::{CredentialStore, StoredSession};
pub use firebase::FirebaseProvider;
pub use memory::MemoryIdentityProvider;

/// Trait for external identity providers
///
/// Implementations verify credentials, issue identities and own session
/// persistence. Every state change they make (sign-in, sign-out, token expiry)
/// must be published on the channel returned by [`auth_state`](Self::auth_state).
///
/// Error codes use the `auth/<kebab-case>` vocabulary understood by
/// [`ProviderError::category`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in
    async fn register(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Sign in with email and password
    async fn login(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Sign in through the social (Google) provider
    async fn login_with_provider(&self) -> Result<Identity, ProviderError>;

    /// Sign out the current user
    async fn logout(&self) -> Result<(), ProviderError>;

    /// Resolve the initial sign-in state
    ///
    /// Must leave the ambient state out of [`AuthState::Pending`], even on error.
    async fn restore(&self) -> Result<(), ProviderError>;

    /// Ambient sign-in state
    fn auth_state(&self) -> watch::Receiver<AuthState>;

    /// Stop background work (token refresh and similar)
    async fn shutdown(&self) {}

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Pass-through to the identity provider that reduces failures to [`ErrorCategory`]
///
/// No retries: a single failed attempt surfaces immediately.
#[derive(Clone)]
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityGateway {
    /// Wrap a provider
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Name of the wrapped provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Create an account
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity, ErrorCategory> {
        self.provider
            .register(email, password)
            .await
            .map_err(|e| self.translate(AuthOperation::Register, e))
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ErrorCategory> {
        self.provider
            .login(email, password)
            .await
            .map_err(|e| self.translate(AuthOperation::Login, e))
    }

    /// Sign in through the social provider
    pub async fn login_with_provider(&self) -> Result<Identity, ErrorCategory> {
        self.provider
            .login_with_provider()
            .await
            .map_err(|e| self.translate(AuthOperation::ProviderLogin, e))
    }

    /// Sign out
    pub async fn logout(&self) -> Result<(), ErrorCategory> {
        self.provider
            .logout()
            .await
            .map_err(|e| self.translate(AuthOperation::Logout, e))
    }

    /// Resolve the initial sign-in state
    pub async fn restore(&self) -> Result<(), ErrorCategory> {
        self.provider.restore().await.map_err(|e| {
            warn!(
                provider = self.provider.name(),
                code = %e.code,
                "Initial identity check failed"
            );
            e.category()
        })
    }

    /// Current ambient state
    pub fn current(&self) -> AuthState {
        self.provider.auth_state().borrow().clone()
    }

    /// Subscribe to ambient sign-in changes
    ///
    /// `on_change` is called once with the current state before this returns,
    /// then again from a background task for every change. The listener stops
    /// when the returned handle is unsubscribed or dropped.
    pub fn subscribe<F>(&self, on_change: F) -> AuthSubscription
    where
        F: Fn(AuthState) + Send + Sync + 'static,
    {
        let mut receiver = self.provider.auth_state();
        let initial = receiver.borrow_and_update().clone();
        on_change(initial);

        let provider = self.provider.name();
        let handle = tokio::spawn(async move {
            while receiver.changed().await.is_ok() {
                let state = receiver.borrow_and_update().clone();
                debug!(provider, state = ?state, "Ambient auth state changed");
                on_change(state);
            }
            debug!(provider, "Auth state channel closed");
        });

        AuthSubscription {
            handle: Some(handle),
        }
    }

    /// Stop provider background work
    pub async fn shutdown(&self) {
        self.provider.shutdown().await;
        info!(provider = self.provider.name(), "Identity provider stopped");
    }

    fn translate(&self, operation: AuthOperation, error: ProviderError) -> ErrorCategory {
        let category = error.category();
        warn!(
            provider = self.provider.name(),
            operation = ?operation,
            code = %error.code,
            category = %category,
            "Identity provider rejected operation"
        );
        category
    }
}

/// Handle for an ambient auth-state subscription
///
/// Dropping the handle unsubscribes.
pub struct AuthSubscription {
    handle: Option<JoinHandle<()>>,
}

impl AuthSubscription {
    /// Stop receiving notifications
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// Whether the listener task is still running
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
