//! Session store
//!
//! [`SessionStore`] is the single authority on who is signed in. It holds
//! [`SessionState`] in a `watch` channel, runs the four authentication actions
//! against the [`IdentityGateway`], and follows the provider's ambient sign-in
//! state so that sign-outs the user never asked for (token expiry, revocation)
//! still reach every observer.
//!
//! At most one authentication action runs at a time. `is_loading` is set before
//! the first await of an action and cleared when it settles, whatever the outcome,
//! including when the caller stops waiting.

use crate::error::{Error, ErrorCategory, Result, ValidationError};
use crate::identity::{AuthSubscription, IdentityGateway};
use crate::types::{AuthOperation, AuthState, Event, Identity, SessionState};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

mod forms;

pub use forms::{LoginForm, RegistrationForm};

const LOGIN_SUCCESS: &str = "Login successful! Welcome back to FindNews.";
const REGISTER_SUCCESS: &str =
    "Account created! Welcome to FindNews! You can now start exploring the latest news.";
const REGISTER_FAILED: &str = "Registration failed. Please try again with different credentials.";
const LOGOUT_FAILED: &str = "Logout failed. Please try again.";

/// Holds the current identity and runs authentication actions
pub struct SessionStore {
    gateway: IdentityGateway,
    core: SessionCore,
    min_password_length: usize,
    subscription: Mutex<Option<AuthSubscription>>,
}

/// State and event channel, shared with actions running on their own task
#[derive(Clone)]
struct SessionCore {
    state: Arc<watch::Sender<SessionState>>,
    event_tx: broadcast::Sender<Event>,
}

/// Applies a gateway outcome to session state
type Finish<T> =
    fn(&SessionCore, AuthOperation, std::result::Result<T, ErrorCategory>) -> Result<T>;

impl SessionStore {
    /// Create a store; call [`attach`](Self::attach) to start following the provider
    pub fn new(
        gateway: IdentityGateway,
        event_tx: broadcast::Sender<Event>,
        min_password_length: usize,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            core: SessionCore {
                state: Arc::new(state),
                event_tx,
            },
            min_password_length,
            subscription: Mutex::new(None),
        }
    }

    /// Start following the provider's ambient sign-in state
    ///
    /// Calling this twice replaces the previous subscription.
    pub fn attach(&self) {
        let state = self.core.state.clone();
        let event_tx = self.core.event_tx.clone();

        let subscription = self.gateway.subscribe(move |auth: AuthState| {
            apply_ambient(&state, &event_tx, auth);
        });

        if self.subscription_slot().replace(subscription).is_some() {
            debug!("Replaced existing auth subscription");
        }
    }

    /// Stop following the provider
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription_slot().take() {
            subscription.unsubscribe();
            debug!("Auth subscription released");
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.core.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.core.state.subscribe()
    }

    /// Wait until the provider's initial check has been observed
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.core.state.subscribe();
        match rx.wait_for(|state| state.resolved).await {
            Ok(state) => state.clone(),
            // sender lives in self, so this only happens mid-teardown
            Err(_) => self.state(),
        }
    }

    /// Minimum password length enforced by [`register_form`](Self::register_form)
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let form = LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        };
        if let Err(e) = form.validate() {
            return Err(self.core.reject(e));
        }

        let gateway = self.gateway.clone();
        let LoginForm { email, password } = form;
        self.run(
            AuthOperation::Login,
            async move { gateway.login(email.trim(), &password).await },
            SessionCore::signed_in,
        )
        .await
    }

    /// Create an account; the confirmation check is the caller's job
    ///
    /// Password length is still enforced here.
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity> {
        let form = RegistrationForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: password.to_string(),
        };
        self.register_form(&form).await
    }

    /// Validate a registration form, then create the account
    ///
    /// Validation failures never reach the identity provider.
    pub async fn register_form(&self, form: &RegistrationForm) -> Result<Identity> {
        if let Err(e) = form.validate(self.min_password_length) {
            return Err(self.core.reject(e));
        }

        let gateway = self.gateway.clone();
        let email = form.email.trim().to_string();
        let password = form.password.clone();
        self.run(
            AuthOperation::Register,
            async move { gateway.register(&email, &password).await },
            SessionCore::signed_in,
        )
        .await
    }

    /// Sign in through the social provider
    pub async fn login_with_provider(&self) -> Result<Identity> {
        let gateway = self.gateway.clone();
        self.run(
            AuthOperation::ProviderLogin,
            async move { gateway.login_with_provider().await },
            SessionCore::signed_in,
        )
        .await
    }

    /// Sign out; succeeds when nobody is signed in
    pub async fn logout(&self) -> Result<()> {
        let gateway = self.gateway.clone();
        self.run(
            AuthOperation::Logout,
            async move { gateway.logout().await },
            SessionCore::signed_out,
        )
        .await
    }

    /// Run one action: begin, then await the single gateway call and settle on
    /// a spawned task
    ///
    /// The task owns the outcome, so a caller that goes away mid-call (a client
    /// disconnecting from the API) neither cancels the provider request nor
    /// leaves `is_loading` stuck.
    async fn run<T, F>(&self, operation: AuthOperation, call: F, finish: Finish<T>) -> Result<T>
    where
        T: Send + 'static,
        F: Future<Output = std::result::Result<T, ErrorCategory>> + Send + 'static,
    {
        self.core.begin(operation)?;

        let core = self.core.clone();
        let task = tokio::spawn(async move { finish(&core, operation, call.await) });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, operation = ?operation, "Authentication task aborted");
                Err(self.core.fail(operation, ErrorCategory::Unknown))
            }
        }
    }

    fn subscription_slot(&self) -> MutexGuard<'_, Option<AuthSubscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionCore {
    /// Mark an operation in flight, refusing if one already is
    fn begin(&self, operation: AuthOperation) -> Result<()> {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading {
                false
            } else {
                state.is_loading = true;
                state.last_error = None;
                true
            }
        });

        if !started {
            warn!(operation = ?operation, "Authentication already in progress");
            return Err(Error::AuthInProgress);
        }

        debug!(operation = ?operation, "Authentication started");
        self.emit(Event::SessionLoading { operation });
        Ok(())
    }

    fn signed_in(
        &self,
        operation: AuthOperation,
        outcome: std::result::Result<Identity, ErrorCategory>,
    ) -> Result<Identity> {
        let identity = match outcome {
            Ok(identity) => identity,
            Err(category) => return Err(self.fail(operation, category)),
        };

        let changed = self.settle(|state| {
            let changed = state.identity.as_ref() != Some(&identity);
            state.identity = Some(identity.clone());
            state.last_error = None;
            state.resolved = true;
            changed
        });
        if changed {
            self.emit(Event::SignedIn {
                identity: identity.clone(),
            });
        }
        let message = match operation {
            AuthOperation::Register => REGISTER_SUCCESS,
            _ => LOGIN_SUCCESS,
        };
        self.emit(Event::success(message));
        info!(uid = %identity.uid, operation = ?operation, "Signed in");
        Ok(identity)
    }

    fn signed_out(
        &self,
        operation: AuthOperation,
        outcome: std::result::Result<(), ErrorCategory>,
    ) -> Result<()> {
        if let Err(category) = outcome {
            return Err(self.fail(operation, category));
        }

        let was_signed_in = self.settle(|state| {
            let had_identity = state.identity.take().is_some();
            state.last_error = None;
            state.resolved = true;
            had_identity
        });
        if was_signed_in {
            self.emit(Event::SignedOut);
        }
        info!("Signed out");
        Ok(())
    }

    /// Clear `is_loading` and apply `update`, returning its result
    fn settle(&self, update: impl FnOnce(&mut SessionState) -> bool) -> bool {
        let mut outcome = false;
        self.state.send_modify(|state| {
            state.is_loading = false;
            outcome = update(state);
        });
        outcome
    }

    fn fail(&self, operation: AuthOperation, category: ErrorCategory) -> Error {
        self.settle(|state| {
            state.last_error = Some(category);
            false
        });
        self.emit(Event::AuthFailed {
            operation,
            category,
        });
        self.emit(Event::failure(failure_message(operation, category)));
        Error::Auth(category)
    }

    fn reject(&self, error: ValidationError) -> Error {
        debug!(error = %error, "Form rejected before provider call");
        self.emit(Event::failure(error.to_string()));
        Error::Validation(error)
    }

    fn emit(&self, event: Event) {
        // no subscribers is fine
        self.event_tx.send(event).ok();
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Toast text for a failed action
fn failure_message(operation: AuthOperation, category: ErrorCategory) -> &'static str {
    match (operation, category) {
        (AuthOperation::Login | AuthOperation::ProviderLogin, _) => {
            ErrorCategory::InvalidCredentials.user_message()
        }
        (
            AuthOperation::Register,
            ErrorCategory::EmailAlreadyInUse
            | ErrorCategory::InvalidEmail
            | ErrorCategory::WeakPassword,
        ) => category.user_message(),
        (AuthOperation::Register, _) => REGISTER_FAILED,
        (AuthOperation::Logout, _) => LOGOUT_FAILED,
    }
}

/// Fold an ambient provider notification into session state
fn apply_ambient(
    state: &watch::Sender<SessionState>,
    event_tx: &broadcast::Sender<Event>,
    auth: AuthState,
) {
    if !auth.is_resolved() {
        return;
    }

    let identity = auth.identity().cloned();
    let mut changed = false;
    state.send_if_modified(|current| {
        let first = !current.resolved;
        current.resolved = true;
        if current.identity != identity {
            current.identity = identity.clone();
            changed = true;
        }
        first || changed
    });

    if !changed {
        return;
    }

    match identity {
        Some(identity) => {
            info!(uid = %identity.uid, "Provider reports signed in");
            event_tx.send(Event::SignedIn { identity }).ok();
        }
        None => {
            info!("Provider reports signed out");
            event_tx.send(Event::SignedOut).ok();
        }
    }
}
