//! Test configuration helpers: offline configs and live credentials from .env

use findnews::Config;
use std::net::SocketAddr;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Config reading the feed from `feed_url`, API on an OS-assigned port
pub fn offline_config(feed_url: &str) -> Config {
    let mut config = Config::default();
    config.feed.url = feed_url.to_string();
    config.server.api.bind_address = SocketAddr::from(([127, 0, 0, 1], 0));
    config
}

/// Firebase credentials for live tests
#[derive(Debug, Clone)]
pub struct LiveCredentials {
    /// Web API key of the test project
    pub api_key: String,
    /// Existing account email
    pub email: String,
    /// Existing account password
    pub password: String,
}

/// Load live Firebase credentials from the environment
///
/// Required environment variables:
/// - `FIREBASE_API_KEY` - Web API key of a test project
/// - `FINDNEWS_TEST_EMAIL` - Email of an existing account
/// - `FINDNEWS_TEST_PASSWORD` - Its password
pub fn load_live_credentials() -> Result<LiveCredentials, ConfigError> {
    dotenvy::dotenv().ok();

    let var = |name: &str| {
        std::env::var(name).map_err(|_| ConfigError(format!("{name} not set in environment")))
    };

    Ok(LiveCredentials {
        api_key: var("FIREBASE_API_KEY")?,
        email: var("FINDNEWS_TEST_EMAIL")?,
        password: var("FINDNEWS_TEST_PASSWORD")?,
    })
}

/// Whether live credentials are available
pub fn has_live_credentials() -> bool {
    load_live_credentials().is_ok()
}
