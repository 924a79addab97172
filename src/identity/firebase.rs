//! Firebase Authentication over the Identity Toolkit REST API

use super::IdentityProvider;
use super::credentials::{CredentialStore, StoredSession};
use crate::config::IdentityConfig;
use crate::error::{Error, ProviderError};
use crate::types::{AuthState, Identity};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const NETWORK_FAILURE: &str = "auth/network-request-failed";

/// Delay before retrying a refresh that failed on the network
const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Redirect URI reported to `signInWithIdp`; only the ID token is checked
const IDP_REQUEST_URI: &str = "http://localhost";

/// Identity provider backed by Firebase Authentication
///
/// Uses `accounts:signUp`, `accounts:signInWithPassword` and
/// `accounts:signInWithIdp` for sign-in and the Secure Token service for
/// refresh. When `session_path` is configured the signed-in session is kept on
/// disk and picked up again by [`restore`](IdentityProvider::restore).
///
/// After every sign-in a background task refreshes the ID token shortly before
/// it expires. If Firebase rejects the refresh (revoked account, disabled user)
/// the ambient state flips to signed out.
pub struct FirebaseProvider {
    shared: Arc<Shared>,
    auth_base_url: String,
    google_id_token: Option<String>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

struct Shared {
    http: reqwest::Client,
    api_key: String,
    token_base_url: String,
    store: Option<CredentialStore>,
    state: watch::Sender<AuthState>,
    session: Mutex<Option<StoredSession>>,
}

impl FirebaseProvider {
    /// Build a provider from the identity configuration
    ///
    /// Fails with [`Error::Config`] when no API key is set.
    pub fn new(config: &IdentityConfig) -> crate::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::Config {
                message: "firebase provider requires an API key".into(),
                key: Some("identity.api_key".into()),
            })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("findnews/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let (state, _) = watch::channel(AuthState::Pending);

        Ok(Self {
            shared: Arc::new(Shared {
                http,
                api_key,
                token_base_url: config.token_base_url.trim_end_matches('/').to_string(),
                store: config.session_path.clone().map(CredentialStore::new),
                state,
                session: Mutex::new(None),
            }),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
            google_id_token: config.google_id_token.clone(),
            refresh_task: Mutex::new(None),
            cancel: CancellationToken::new(),
        })
    }

    async fn sign_in(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<Identity, ProviderError> {
        let url = format!("{}/accounts:{}", self.auth_base_url, endpoint);
        debug!(endpoint, "Calling identity toolkit");

        let response = self
            .shared
            .http
            .post(&url)
            .query(&[("key", self.shared.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let response = check_response(response).await?;
        let payload: SignInResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                "auth/internal-error",
                format!("malformed sign-in response: {}", e),
            )
        })?;

        let session = payload.into_session()?;
        Ok(self.establish(session))
    }

    /// Install a fresh session, publish it, and start the expiry watcher
    fn establish(&self, session: StoredSession) -> Identity {
        let identity = session.identity();
        self.shared.install(session);
        self.shared
            .state
            .send_replace(AuthState::SignedIn(identity.clone()));
        self.schedule_refresh();
        info!(uid = %identity.uid, "Firebase session established");
        identity
    }

    fn schedule_refresh(&self) {
        let handle = tokio::spawn(watch_expiry(self.shared.clone(), self.cancel.clone()));
        if let Some(previous) = self.refresh_slot().replace(handle) {
            previous.abort();
        }
    }

    fn stop_refresh(&self) {
        if let Some(handle) = self.refresh_slot().take() {
            handle.abort();
        }
    }

    fn refresh_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FirebaseProvider {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl IdentityProvider for FirebaseProvider {
    async fn register(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.sign_in(
            "signUp",
            serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.sign_in(
            "signInWithPassword",
            serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn login_with_provider(&self) -> Result<Identity, ProviderError> {
        let id_token = self.google_id_token.as_deref().ok_or_else(|| {
            ProviderError::new(
                "auth/operation-not-allowed",
                "Google sign-in requires identity.google_id_token",
            )
        })?;

        let post_body = format!(
            "id_token={}&providerId=google.com",
            urlencoding::encode(id_token)
        );

        self.sign_in(
            "signInWithIdp",
            serde_json::json!({
                "postBody": post_body,
                "requestUri": IDP_REQUEST_URI,
                "returnIdpCredential": true,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn logout(&self) -> Result<(), ProviderError> {
        self.stop_refresh();
        self.shared.end_session(true);
        info!("Firebase session ended");
        Ok(())
    }

    async fn restore(&self) -> Result<(), ProviderError> {
        if self.shared.state.borrow().is_resolved() {
            return Ok(());
        }

        let Some(store) = &self.shared.store else {
            self.shared.state.send_replace(AuthState::SignedOut);
            return Ok(());
        };

        let stored = match store.load() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(path = %store.path().display(), error = %e, "Ignoring unreadable session file");
                self.shared.state.send_replace(AuthState::SignedOut);
                return Err(ProviderError::new("auth/internal-error", e.to_string()));
            }
        };

        let Some(stored) = stored else {
            debug!("No persisted session");
            self.shared.state.send_replace(AuthState::SignedOut);
            return Ok(());
        };

        if !stored.is_expired(Utc::now()) {
            self.establish(stored);
            return Ok(());
        }

        debug!(uid = %stored.uid, "Persisted token expired, refreshing");
        match self.shared.exchange_refresh_token(&stored).await {
            Ok(refreshed) => {
                self.establish(refreshed);
                Ok(())
            }
            Err(e) => {
                warn!(code = %e.code, "Persisted session could not be refreshed");
                self.shared.end_session(e.code != NETWORK_FAILURE);
                Err(e)
            }
        }
    }

    fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.shared.state.subscribe()
    }

    async fn shutdown(&self) {
        self.cancel.cancel();
        self.stop_refresh();
    }

    fn name(&self) -> &'static str {
        "firebase"
    }
}

impl Shared {
    fn session_slot(&self) -> MutexGuard<'_, Option<StoredSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install(&self, session: StoredSession) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(&session)
        {
            warn!(path = %store.path().display(), error = %e, "Failed to persist session");
        }
        *self.session_slot() = Some(session);
    }

    /// Drop the session and publish signed-out; `forget` also deletes the file
    fn end_session(&self, forget: bool) {
        self.session_slot().take();
        if forget
            && let Some(store) = &self.store
            && let Err(e) = store.clear()
        {
            warn!(path = %store.path().display(), error = %e, "Failed to delete session file");
        }
        self.state.send_replace(AuthState::SignedOut);
    }

    fn current(&self) -> Option<StoredSession> {
        self.session_slot().clone()
    }

    async fn refresh(&self) -> Result<StoredSession, ProviderError> {
        let current = self
            .current()
            .ok_or_else(|| ProviderError::new("auth/no-current-user", "No session to refresh"))?;
        let refreshed = self.exchange_refresh_token(&current).await?;
        self.install(refreshed.clone());
        Ok(refreshed)
    }

    async fn exchange_refresh_token(
        &self,
        current: &StoredSession,
    ) -> Result<StoredSession, ProviderError> {
        let url = format!("{}/token", self.token_base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let response = check_response(response).await?;
        let payload: RefreshResponse = response.json().await.map_err(|e| {
            ProviderError::new(
                "auth/internal-error",
                format!("malformed token response: {}", e),
            )
        })?;

        Ok(StoredSession {
            uid: payload.user_id,
            email: current.email.clone(),
            id_token: payload.id_token,
            refresh_token: payload.refresh_token,
            expires_at: expires_at(&payload.expires_in)?,
        })
    }
}

/// Background task refreshing the ID token ahead of expiry
async fn watch_expiry(shared: Arc<Shared>, cancel: CancellationToken) {
    let Some(session) = shared.current() else {
        return;
    };
    let mut delay = session.refresh_due_in(Utc::now());

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        match shared.refresh().await {
            Ok(session) => {
                delay = session.refresh_due_in(Utc::now()).max(REFRESH_RETRY_DELAY);
                debug!(uid = %session.uid, "ID token refreshed");
            }
            Err(e) if e.code == NETWORK_FAILURE && still_valid(&shared) => {
                warn!(error = %e, "Token refresh failed, retrying");
                delay = REFRESH_RETRY_DELAY;
            }
            Err(e) => {
                warn!(code = %e.code, "Token refresh rejected, ending session");
                shared.end_session(e.code != NETWORK_FAILURE);
                return;
            }
        }
    }
}

fn still_valid(shared: &Shared) -> bool {
    shared
        .current()
        .is_some_and(|session| Utc::now() < session.expires_at)
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));

    Err(map_rest_error(&message))
}

/// Translate an Identity Toolkit error message into an `auth/...` code
///
/// Messages look like `WEAK_PASSWORD : Password should be at least 6 characters`;
/// only the part before ` : ` is significant.
pub(crate) fn map_rest_error(message: &str) -> ProviderError {
    let reason = message.split(" : ").next().unwrap_or(message).trim();
    let code = match reason {
        "EMAIL_EXISTS" => "auth/email-already-in-use",
        "EMAIL_NOT_FOUND" => "auth/user-not-found",
        "INVALID_PASSWORD" => "auth/wrong-password",
        "INVALID_LOGIN_CREDENTIALS" => "auth/invalid-credential",
        "INVALID_EMAIL" => "auth/invalid-email",
        "WEAK_PASSWORD" => "auth/weak-password",
        "MISSING_PASSWORD" => "auth/missing-password",
        "MISSING_EMAIL" => "auth/missing-email",
        "USER_DISABLED" => "auth/user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        "INVALID_IDP_RESPONSE" => "auth/invalid-credential",
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => "auth/user-token-expired",
        _ => "auth/internal-error",
    };
    ProviderError::new(code, message)
}

fn expires_at(expires_in: &str) -> Result<chrono::DateTime<Utc>, ProviderError> {
    let secs: i64 = expires_in.trim().parse().map_err(|_| {
        ProviderError::new(
            "auth/internal-error",
            format!("invalid expiresIn value '{}'", expires_in),
        )
    })?;
    Ok(Utc::now() + chrono::Duration::seconds(secs))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

impl SignInResponse {
    fn into_session(self) -> Result<StoredSession, ProviderError> {
        Ok(StoredSession {
            uid: self.local_id,
            email: self.email.filter(|e| !e.is_empty()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expires_at(&self.expires_in)?,
        })
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, session_path: Option<std::path::PathBuf>) -> IdentityConfig {
        IdentityConfig {
            api_key: Some("test-key".into()),
            auth_base_url: format!("{}/v1", server.uri()),
            token_base_url: format!("{}/v1", server.uri()),
            session_path,
            google_id_token: Some("google token/+".into()),
            ..IdentityConfig::default()
        }
    }

    fn sign_in_body(uid: &str, email: &str, expires_in: &str) -> serde_json::Value {
        serde_json::json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": uid,
            "email": email,
            "idToken": "id-token-1",
            "refreshToken": "refresh-token-1",
            "expiresIn": expires_in,
            "registered": true,
        })
    }

    fn error_body(message: &str) -> serde_json::Value {
        serde_json::json!({
            "error": { "code": 400, "message": message, "errors": [] }
        })
    }

    fn stored(expires_in: chrono::Duration) -> StoredSession {
        StoredSession {
            uid: "uid-stored".into(),
            email: Some("stored@example.com".into()),
            id_token: "old-id".into(),
            refresh_token: "old-refresh".into(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn new_requires_api_key() {
        let err = FirebaseProvider::new(&IdentityConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn rest_errors_map_to_auth_codes() {
        let cases = [
            ("EMAIL_EXISTS", "auth/email-already-in-use"),
            ("EMAIL_NOT_FOUND", "auth/user-not-found"),
            ("INVALID_PASSWORD", "auth/wrong-password"),
            ("INVALID_LOGIN_CREDENTIALS", "auth/invalid-credential"),
            ("INVALID_EMAIL", "auth/invalid-email"),
            (
                "WEAK_PASSWORD : Password should be at least 6 characters",
                "auth/weak-password",
            ),
            ("TOKEN_EXPIRED", "auth/user-token-expired"),
            ("SOMETHING_NEW", "auth/internal-error"),
        ];

        for (message, code) in cases {
            assert_eq!(map_rest_error(message).code, code, "{message}");
        }
    }

    #[tokio::test]
    async fn login_publishes_and_persists_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "email": "reader@example.com",
                "returnSecureToken": true,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sign_in_body("uid-1", "reader@example.com", "3600")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let provider = FirebaseProvider::new(&config(&server, Some(session_path.clone()))).unwrap();

        let identity = provider.login("reader@example.com", "hunter22").await.unwrap();

        assert_eq!(identity, Identity::new("uid-1", "reader@example.com"));
        assert_eq!(
            *provider.auth_state().borrow(),
            AuthState::SignedIn(identity.clone())
        );
        let saved = CredentialStore::new(&session_path).load().unwrap().unwrap();
        assert_eq!(saved.uid, "uid-1");
        assert_eq!(saved.refresh_token, "refresh-token-1");
    }

    #[tokio::test]
    async fn rejected_login_keeps_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(error_body("INVALID_LOGIN_CREDENTIALS")),
            )
            .mount(&server)
            .await;

        let provider = FirebaseProvider::new(&config(&server, None)).unwrap();
        let err = provider.login("a@b.co", "wrong").await.unwrap_err();

        assert_eq!(err.code, "auth/invalid-credential");
        assert_eq!(*provider.auth_state().borrow(), AuthState::Pending);
    }

    #[tokio::test]
    async fn register_weak_password_maps_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            )))
            .mount(&server)
            .await;

        let provider = FirebaseProvider::new(&config(&server, None)).unwrap();
        let err = provider.register("a@b.co", "123").await.unwrap_err();
        assert_eq!(err.code, "auth/weak-password");
    }

    #[tokio::test]
    async fn non_json_error_body_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let provider = FirebaseProvider::new(&config(&server, None)).unwrap();
        let err = provider.register("a@b.co", "secret1").await.unwrap_err();
        assert_eq!(err.code, "auth/internal-error");
        assert_eq!(err.message, "HTTP 503");
    }

    #[tokio::test]
    async fn google_sign_in_sends_encoded_post_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithIdp"))
            .and(body_string_contains(
                "id_token=google%20token%2F%2B&providerId=google.com",
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sign_in_body("g-1", "g@gmail.com", "3600")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = FirebaseProvider::new(&config(&server, None)).unwrap();
        let identity = provider.login_with_provider().await.unwrap();
        assert_eq!(identity.uid, "g-1");
    }

    #[tokio::test]
    async fn google_sign_in_without_token_is_not_allowed() {
        let server = MockServer::start().await;
        let mut cfg = config(&server, None);
        cfg.google_id_token = None;

        let provider = FirebaseProvider::new(&cfg).unwrap();
        let err = provider.login_with_provider().await.unwrap_err();
        assert_eq!(err.code, "auth/operation-not-allowed");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restore_without_file_signs_out() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let provider =
            FirebaseProvider::new(&config(&server, Some(dir.path().join("none.json")))).unwrap();

        provider.restore().await.unwrap();
        assert_eq!(*provider.auth_state().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn restore_valid_session_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let session = stored(chrono::Duration::hours(1));
        CredentialStore::new(&session_path).save(&session).unwrap();

        let provider = FirebaseProvider::new(&config(&server, Some(session_path))).unwrap();
        provider.restore().await.unwrap();

        assert_eq!(
            *provider.auth_state().borrow(),
            AuthState::SignedIn(session.identity())
        );
    }

    #[tokio::test]
    async fn restore_expired_session_refreshes_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expires_in": "3600",
                "token_type": "Bearer",
                "refresh_token": "new-refresh",
                "id_token": "new-id",
                "user_id": "uid-stored",
                "project_id": "findnews",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        CredentialStore::new(&session_path)
            .save(&stored(chrono::Duration::minutes(-10)))
            .unwrap();

        let provider = FirebaseProvider::new(&config(&server, Some(session_path.clone()))).unwrap();
        provider.restore().await.unwrap();

        let state = provider.auth_state().borrow().clone();
        let identity = state.identity().unwrap();
        assert_eq!(identity.uid, "uid-stored");
        assert_eq!(identity.email.as_deref(), Some("stored@example.com"));

        let saved = CredentialStore::new(&session_path).load().unwrap().unwrap();
        assert_eq!(saved.refresh_token, "new-refresh");
        assert!(!saved.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn restore_with_revoked_token_signs_out_and_forgets() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("TOKEN_EXPIRED")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        CredentialStore::new(&session_path)
            .save(&stored(chrono::Duration::minutes(-10)))
            .unwrap();

        let provider = FirebaseProvider::new(&config(&server, Some(session_path.clone()))).unwrap();
        let err = provider.restore().await.unwrap_err();

        assert_eq!(err.code, "auth/user-token-expired");
        assert_eq!(*provider.auth_state().borrow(), AuthState::SignedOut);
        assert!(!session_path.exists());
    }

    #[tokio::test]
    async fn rejected_background_refresh_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(sign_in_body("uid-1", "a@b.co", "0")),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body("USER_DISABLED")))
            .mount(&server)
            .await;

        let provider = FirebaseProvider::new(&config(&server, None)).unwrap();
        let mut rx = provider.auth_state();
        provider.login("a@b.co", "secret1").await.unwrap();

        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|state| *state == AuthState::SignedOut),
        )
        .await
        .expect("refresh task should end the session")
        .unwrap()
        .clone();
        assert_eq!(state, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn logout_clears_file_and_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sign_in_body("uid-1", "a@b.co", "3600")),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let provider = FirebaseProvider::new(&config(&server, Some(session_path.clone()))).unwrap();

        provider.register("a@b.co", "secret1").await.unwrap();
        assert!(session_path.exists());

        provider.logout().await.unwrap();
        assert!(!session_path.exists());
        assert_eq!(*provider.auth_state().borrow(), AuthState::SignedOut);

        // already signed out
        provider.logout().await.unwrap();
    }
}
