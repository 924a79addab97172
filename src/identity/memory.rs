//! In-memory identity provider

use super::IdentityProvider;
use crate::error::ProviderError;
use crate::types::{AuthState, Identity};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

/// Shortest password the provider accepts, mirroring Firebase
pub const MIN_PROVIDER_PASSWORD_LENGTH: usize = 6;

struct Account {
    identity: Identity,
    digest: String,
}

/// Identity provider keeping accounts in process memory
///
/// Accounts are keyed by lower-cased email and store a salted SHA-256 digest of
/// the password, never the password itself. Validation matches what Firebase
/// enforces server-side, so the same error codes come back for the same input.
///
/// Nothing survives a restart: [`restore`](IdentityProvider::restore) always
/// resolves to signed out.
///
/// # Examples
///
/// ```
/// use findnews::identity::{IdentityProvider, MemoryIdentityProvider};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = MemoryIdentityProvider::new();
/// provider.add_account("reader@example.com", "hunter22")?;
///
/// let identity = provider.login("reader@example.com", "hunter22").await?;
/// assert_eq!(identity.email.as_deref(), Some("reader@example.com"));
/// # Ok(())
/// # }
/// ```
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    social_identity: Option<Identity>,
    state: watch::Sender<AuthState>,
}

impl MemoryIdentityProvider {
    /// Empty provider with no social sign-in
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::Pending);
        Self {
            accounts: Mutex::new(HashMap::new()),
            social_identity: None,
            state,
        }
    }

    /// Identity returned by [`login_with_provider`](IdentityProvider::login_with_provider)
    pub fn with_social_identity(mut self, identity: Identity) -> Self {
        self.social_identity = Some(identity);
        self
    }

    /// Create an account without signing it in
    pub fn add_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PROVIDER_PASSWORD_LENGTH {
            return Err(ProviderError::new(
                "auth/weak-password",
                format!(
                    "Password should be at least {} characters",
                    MIN_PROVIDER_PASSWORD_LENGTH
                ),
            ));
        }

        let mut accounts = self.accounts();
        if accounts.contains_key(&email) {
            return Err(ProviderError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }

        let uid = derive_uid(&email);
        let identity = Identity::new(uid.clone(), email.clone());
        accounts.insert(
            email,
            Account {
                identity: identity.clone(),
                digest: password_digest(&uid, password),
            },
        );
        debug!(uid = %identity.uid, "Account created");
        Ok(identity)
    }

    /// Number of registered accounts
    pub fn account_count(&self) -> usize {
        self.accounts().len()
    }

    /// End the current session from the provider side
    ///
    /// Simulates token revocation: the ambient state becomes signed out without
    /// any call from the session store.
    pub fn expire_session(&self) {
        let expired = self.state.send_if_modified(|state| {
            if matches!(state, AuthState::SignedIn(_)) {
                *state = AuthState::SignedOut;
                true
            } else {
                false
            }
        });
        if expired {
            info!("Session expired by provider");
        }
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sign_in(&self, identity: Identity) -> Identity {
        self.state.send_replace(AuthState::SignedIn(identity.clone()));
        identity
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn register(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let identity = self.add_account(email, password)?;
        Ok(self.sign_in(identity))
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(ProviderError::new(
                "auth/missing-password",
                "A password is required.",
            ));
        }

        let identity = {
            let accounts = self.accounts();
            let account = accounts
                .get(&email)
                .filter(|account| account.digest == password_digest(&account.identity.uid, password))
                .ok_or_else(|| {
                    ProviderError::new("auth/invalid-credential", "Invalid login credentials.")
                })?;
            account.identity.clone()
        };

        Ok(self.sign_in(identity))
    }

    async fn login_with_provider(&self) -> Result<Identity, ProviderError> {
        let identity = self.social_identity.clone().ok_or_else(|| {
            ProviderError::new(
                "auth/operation-not-allowed",
                "No social identity is configured.",
            )
        })?;
        Ok(self.sign_in(identity))
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        self.state.send_replace(AuthState::SignedOut);
        Ok(())
    }

    async fn restore(&self) -> Result<(), ProviderError> {
        self.state.send_if_modified(|state| {
            if state.is_resolved() {
                false
            } else {
                *state = AuthState::SignedOut;
                true
            }
        });
        Ok(())
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn normalize_email(email: &str) -> Result<String, ProviderError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(ProviderError::new(
            "auth/invalid-email",
            "The email address is badly formatted.",
        ))
    }
}

fn derive_uid(email: &str) -> String {
    let digest = Sha256::digest(format!("findnews-uid:{}", email).as_bytes());
    to_hex(&digest[..14])
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
