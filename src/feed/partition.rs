//! Search filtering and section partitioning
//!
//! Both functions are pure: the same articles and query always give the same
//! sections, and the input is never reordered or modified.

use crate::types::Article;
use tracing::debug;

/// Section boundaries over the filtered sequence
///
/// Featured `[0,1)`, breaking `[1,4)`, main `[4,10)`, sidebar `[10,16)`,
/// trending `[16,21)`. Articles past the last boundary are not shown.
pub const SECTION_BOUNDARIES: [usize; 6] = [0, 1, 4, 10, 16, 21];

/// Feed view section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// Single lead story
    Featured,
    /// Breaking news strip
    Breaking,
    /// Main grid
    Main,
    /// Sidebar list
    Sidebar,
    /// Trending list
    Trending,
}

impl Section {
    /// All sections in display order
    pub const ALL: [Section; 5] = [
        Section::Featured,
        Section::Breaking,
        Section::Main,
        Section::Sidebar,
        Section::Trending,
    ];

    /// Half-open index range of this section in the filtered sequence
    pub fn range(self) -> (usize, usize) {
        let i = self as usize;
        (SECTION_BOUNDARIES[i], SECTION_BOUNDARIES[i + 1])
    }
}

/// Articles split into the five feed sections
///
/// Sections borrow from the article list they were computed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sections<'a> {
    /// Lead story, absent when nothing matches
    pub featured: Option<&'a Article>,
    /// Up to 3 articles
    pub breaking: Vec<&'a Article>,
    /// Up to 6 articles
    pub main: Vec<&'a Article>,
    /// Up to 6 articles
    pub sidebar: Vec<&'a Article>,
    /// Up to 5 articles
    pub trending: Vec<&'a Article>,
    /// Number of articles that matched the query, shown or not
    pub total_matches: usize,
}

impl<'a> Sections<'a> {
    /// Articles of one section
    pub fn section(&self, section: Section) -> &[&'a Article] {
        match section {
            Section::Featured => self.featured.as_slice(),
            Section::Breaking => &self.breaking,
            Section::Main => &self.main,
            Section::Sidebar => &self.sidebar,
            Section::Trending => &self.trending,
        }
    }

    /// Every displayed article in section order
    pub fn flatten(&self) -> Vec<&'a Article> {
        Section::ALL
            .iter()
            .flat_map(|s| self.section(*s).iter().copied())
            .collect()
    }

    /// True when no section has an article
    pub fn is_empty(&self) -> bool {
        self.featured.is_none()
    }
}

/// Articles whose title or description contains `query`, case-insensitively
///
/// An empty query keeps everything. Order is preserved.
pub fn filter<'a>(articles: &'a [Article], query: &str) -> Vec<&'a Article> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return articles.iter().collect();
    }

    articles
        .iter()
        .filter(|article| {
            article.title.to_lowercase().contains(&needle)
                || article
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Filter by `query`, then slice the result at [`SECTION_BOUNDARIES`]
pub fn partition<'a>(articles: &'a [Article], query: &str) -> Sections<'a> {
    let filtered = filter(articles, query);
    let slice = |section: Section| -> Vec<&'a Article> {
        let (start, end) = section.range();
        let end = end.min(filtered.len());
        if start >= end {
            Vec::new()
        } else {
            filtered[start..end].to_vec()
        }
    };

    let sections = Sections {
        featured: filtered.first().copied(),
        breaking: slice(Section::Breaking),
        main: slice(Section::Main),
        sidebar: slice(Section::Sidebar),
        trending: slice(Section::Trending),
        total_matches: filtered.len(),
    };

    debug!(
        total = articles.len(),
        matches = sections.total_matches,
        query_len = query.len(),
        "Partitioned feed"
    );
    sections
}
