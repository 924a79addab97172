//! News feed: fetching, state, and section layout.
//!
//! - [`FeedFetcher`] - one GET against the configured feed URL
//! - [`FeedStore`] - last fetched articles plus loading/error flags
//! - [`partition`] / [`filter`] - search filtering and the five feed sections
//! - [`format_date`] / [`time_ago`] / [`ArticleView`] - display helpers

mod fetcher;
mod format;
mod partition;
mod store;
mod wire;

pub use fetcher::FeedFetcher;
pub use format::{ArticleView, FALLBACK_AUTHOR, PLACEHOLDER_IMAGE, format_date, time_ago};
pub use partition::{SECTION_BOUNDARIES, Section, Sections, filter, partition};
pub use store::FeedStore;
