//! Display helpers for articles

use crate::types::Article;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Image shown when an article has none
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Byline shown when an article has no author
pub const FALLBACK_AUTHOR: &str = "FindNews!";

/// Short US-style date, e.g. `Jan 5, 2024`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Coarse relative age: `Just now`, `5h ago`, `3d ago`
///
/// Anything under an hour, including timestamps in the future, is "Just now".
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - date).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

/// Article as the feed view renders it
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ArticleView {
    /// Headline
    pub title: String,
    /// Teaser text
    pub description: Option<String>,
    /// Link to the full story
    pub url: String,
    /// Lead image, or the placeholder
    pub image_url: String,
    /// Publishing outlet
    pub source_name: String,
    /// Byline, or the fallback
    pub author: String,
    /// Publication time
    pub published_at: DateTime<Utc>,
    /// Formatted publication date
    pub published_date: String,
    /// Relative age at render time
    pub time_ago: String,
}

impl ArticleView {
    /// Render an article relative to `now`
    pub fn render(article: &Article, now: DateTime<Utc>) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            image_url: article
                .image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            source_name: article.source_name.clone(),
            author: article
                .author
                .clone()
                .unwrap_or_else(|| FALLBACK_AUTHOR.to_string()),
            published_at: article.published_at,
            published_date: format_date(article.published_at),
            time_ago: time_ago(article.published_at, now),
        }
    }
}
