//! NewsAPI-style JSON payload

use crate::error::FetchError;
use crate::types::Article;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Option<Vec<WireArticle>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: DateTime<Utc>,
    author: Option<String>,
    source: Option<WireSource>,
}

#[derive(Deserialize)]
struct WireSource {
    name: Option<String>,
}

impl From<WireArticle> for Article {
    fn from(wire: WireArticle) -> Self {
        Article {
            title: wire.title.unwrap_or_default(),
            description: non_empty(wire.description),
            url: wire.url.unwrap_or_default(),
            image_url: non_empty(wire.url_to_image),
            published_at: wire.published_at,
            author: non_empty(wire.author),
            source_name: wire.source.and_then(|s| s.name).unwrap_or_default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Decode a feed body into articles, preserving feed order
///
/// A missing `articles` array is an empty feed. A body with `"status": "error"`
/// is a failure even when it parses.
pub(crate) fn decode(body: &[u8]) -> Result<Vec<Article>, FetchError> {
    let response: NewsResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if response.status.as_deref() == Some("error") {
        return Err(FetchError::Decode(format!(
            "feed reported an error: {}",
            response.message.as_deref().unwrap_or("no message")
        )));
    }

    Ok(response
        .articles
        .unwrap_or_default()
        .into_iter()
        .map(Article::from)
        .collect())
}
