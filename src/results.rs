use serde::{Deserialize, Serialize};

use crate::stats::CrawlStats;

/// A navigation entry, identified by its fragment-free URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Absolute URL with the fragment removed
    pub canonical_url: String,

    /// Position in navigation order, starting at 0
    pub order_index: usize,
}

impl DiscoveredLink {
    pub fn new(canonical_url: String, order_index: usize) -> Self {
        Self {
            canonical_url,
            order_index,
        }
    }
}

/// Extracted content for one discovered link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    /// The link this content was fetched from
    pub link: DiscoveredLink,

    /// Cleaned text, absent when the fetch or the extraction failed
    pub text: Option<String>,
}

impl PageContent {
    pub fn new(link: DiscoveredLink, text: Option<String>) -> Self {
        Self { link, text }
    }

    pub fn is_absent(&self) -> bool {
        self.text.is_none()
    }
}

/// Output of one crawl: contents index-aligned with the discovered links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub contents: Vec<PageContent>,
    pub stats: CrawlStats,
}

impl CrawlResult {
    /// Builds the result and computes its statistics
    pub fn new(contents: Vec<PageContent>) -> Self {
        let stats = CrawlStats::from_texts(contents.iter().filter_map(|c| c.text.as_deref()));
        Self { contents, stats }
    }

    /// Non-absent texts in discovery order, as they are exported
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().filter_map(|c| c.text.as_deref())
    }

    pub fn failed(&self) -> usize {
        self.contents.iter().filter(|c| c.is_absent()).count()
    }
}
