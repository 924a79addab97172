//! Shared test helpers for identity providers.

use super::IdentityProvider;
use crate::error::ProviderError;
use crate::types::{AuthState, Identity};
use async_trait::async_trait;
use tokio::sync::watch;

/// Provider whose initial check never completes, so sessions stay unresolved
pub(crate) struct PendingProvider {
    state: watch::Sender<AuthState>,
}

impl PendingProvider {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Pending);
        Self { state }
    }

    /// Finish the initial check with nobody signed in
    pub(crate) fn resolve_signed_out(&self) {
        self.state.send_replace(AuthState::SignedOut);
    }
}

#[async_trait]
impl IdentityProvider for PendingProvider {
    async fn register(&self, _: &str, _: &str) -> Result<Identity, ProviderError> {
        Err(ProviderError::new("auth/operation-not-allowed", "pending"))
    }

    async fn login(&self, _: &str, _: &str) -> Result<Identity, ProviderError> {
        Err(ProviderError::new("auth/operation-not-allowed", "pending"))
    }

    async fn login_with_provider(&self) -> Result<Identity, ProviderError> {
        Err(ProviderError::new("auth/operation-not-allowed", "pending"))
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn restore(&self) -> Result<(), ProviderError> {
        std::future::pending().await
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn name(&self) -> &'static str {
        "pending"
    }
}
