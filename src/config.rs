//! Configuration types for findnews

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Main configuration for [`NewsApp`](crate::NewsApp)
///
/// Every field has a default, so an empty JSON object is a valid configuration
/// that reads the public CNN feed and keeps accounts in memory.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// News feed source
    #[serde(default)]
    pub feed: FeedConfig,

    /// Identity provider settings
    #[serde(default)]
    pub identity: IdentityConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<()> {
        check_url(&self.feed.url, "feed.url")?;
        check_url(&self.identity.auth_base_url, "identity.auth_base_url")?;
        check_url(&self.identity.token_base_url, "identity.token_base_url")?;

        if self.identity.min_password_length == 0 {
            return Err(Error::Config {
                message: "minimum password length must be at least 1".into(),
                key: Some("identity.min_password_length".into()),
            });
        }

        if self.identity.provider == IdentityProviderKind::Firebase
            && self.identity.api_key.as_deref().unwrap_or("").is_empty()
        {
            return Err(Error::Config {
                message: "firebase provider requires an API key".into(),
                key: Some("identity.api_key".into()),
            });
        }

        Ok(())
    }
}

fn check_url(value: &str, key: &str) -> Result<()> {
    let parsed = url::Url::parse(value).map_err(|e| Error::Config {
        message: format!("invalid URL '{}': {}", value, e),
        key: Some(key.to_string()),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config {
            message: format!("unsupported URL scheme '{}'", other),
            key: Some(key.to_string()),
        }),
    }
}

/// News feed source configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed URL (default: the public CNN "everything" feed)
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// User-Agent header sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (None = transport default)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            user_agent: default_user_agent(),
            request_timeout: None,
        }
    }
}

/// Which identity provider backs the session store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    /// Local in-memory accounts (default)
    #[default]
    Memory,
    /// Firebase Authentication REST API
    Firebase,
}

/// Identity provider configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider implementation (default: memory)
    #[serde(default)]
    pub provider: IdentityProviderKind,

    /// Web API key for the Firebase project
    #[serde(default)]
    pub api_key: Option<String>,

    /// Identity Toolkit base URL
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    /// Secure Token service base URL (token refresh)
    #[serde(default = "default_token_base_url")]
    pub token_base_url: String,

    /// Where to persist the signed-in session between runs (None = not persisted)
    #[serde(default)]
    pub session_path: Option<PathBuf>,

    /// Google ID token used for social sign-in
    #[serde(default)]
    pub google_id_token: Option<String>,

    /// Minimum password length enforced before calling the provider (default: 6)
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderKind::default(),
            api_key: None,
            auth_base_url: default_auth_base_url(),
            token_base_url: default_token_base_url(),
            session_path: None,
            google_id_token: None,
            min_password_length: default_min_password_length(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_feed_url() -> String {
    "https://saurav.tech/NewsAPI/everything/cnn.json".to_string()
}

fn default_user_agent() -> String {
    concat!("findnews/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_auth_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_token_base_url() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}

fn default_min_password_length() -> usize {
    6
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
