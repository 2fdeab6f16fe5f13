use regex::Regex;
use std::collections::HashSet;
use url::Url;

use crate::results::DiscoveredLink;

/// Decides which navigation anchors become crawl targets
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    /// Substrings that reject a link outright (ad trackers and the like)
    denylist: Vec<String>,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a new link filter, compiling the exclude patterns
    pub fn new(denylist: Vec<String>, exclude_patterns: &[String]) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            denylist,
            exclude_regexes,
        })
    }

    /// Resolve a raw `href` against `base` and return its canonical form if the
    /// link should be crawled
    pub fn accept(&self, base: &Url, href: &str) -> Option<Url> {
        let href = href.trim();

        // Fragment-only anchors point back into the current page
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let resolved = match base.join(href) {
            Ok(url) => url,
            Err(e) => {
                ::log::debug!("Skipping unresolvable href {:?}: {}", href, e);
                return None;
            }
        };

        if !matches!(resolved.scheme(), "http" | "https") {
            ::log::debug!("Skipping non-HTTP link: {}", resolved);
            return None;
        }

        let url_str = resolved.as_str();
        if self.denylist.iter().any(|blocked| url_str.contains(blocked.as_str())) {
            ::log::debug!("Denylist rejected: {}", url_str);
            return None;
        }

        if self.exclude_regexes.iter().any(|regex| regex.is_match(url_str)) {
            ::log::debug!("Exclude pattern rejected: {}", url_str);
            return None;
        }

        Some(canonicalize(&resolved))
    }
}

/// Strip the fragment, keeping the query
pub fn canonicalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Accumulates discovered links, keeping the first occurrence of each
/// canonical URL
#[derive(Debug)]
pub struct LinkCollector {
    base: Url,
    seen: HashSet<String>,
    links: Vec<DiscoveredLink>,
}

impl LinkCollector {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            seen: HashSet::new(),
            links: Vec::new(),
        }
    }

    /// Offer a raw href; returns true if it was recorded as a new link
    pub fn offer(&mut self, filter: &LinkFilter, href: &str) -> bool {
        match filter.accept(&self.base, href) {
            Some(canonical) => self.push(canonical),
            None => false,
        }
    }

    /// Record an already canonical URL unless it was seen before
    pub fn push(&mut self, canonical: Url) -> bool {
        let key = canonical.to_string();
        if self.seen.contains(&key) {
            ::log::trace!("Skipping already discovered link: {}", key);
            return false;
        }
        self.seen.insert(key.clone());
        let order_index = self.links.len();
        ::log::debug!("Discovered link {}: {}", order_index, key);
        self.links.push(DiscoveredLink::new(key, order_index));
        true
    }

    pub fn into_links(self) -> Vec<DiscoveredLink> {
        self.links
    }
}
