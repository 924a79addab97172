//! HTTP retrieval of the news feed

use super::wire;
use crate::config::FeedConfig;
use crate::error::{Error, FetchError, Result};
use crate::types::Article;
use tracing::debug;

/// Retrieves the article list from the configured feed URL
///
/// One GET per call, no query parameters and no credentials. Failures are
/// returned as-is; retrying is left to the user.
#[derive(Clone, Debug)]
pub struct FeedFetcher {
    http_client: reqwest::Client,
    url: String,
}

impl FeedFetcher {
    /// Create a fetcher for `config.url`
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
        })
    }

    /// Feed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode the feed
    pub async fn fetch_feed(&self) -> std::result::Result<Vec<Article>, FetchError> {
        debug!(url = %self.url, "Fetching news feed");

        let response = self.http_client.get(&self.url).send().await?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.bytes().await?;
        let articles = wire::decode(&body)?;

        debug!(count = articles.len(), "Feed decoded");
        Ok(articles)
    }
}
