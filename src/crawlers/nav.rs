use futures::future::{FutureExt, LocalBoxFuture};
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::crawlers::snapshot::SnapshotItem;
use crate::error::HarvestError;
use crate::fetcher::PageFetcher;
use crate::filter::{LinkCollector, LinkFilter};
use crate::parsers::{nav_hrefs, parse_selector};
use crate::results::DiscoveredLink;

/// Expansion progress of a navigation item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandState {
    /// Children are hidden or not rendered yet
    Collapsed,
    /// The expand action was issued and the item has not settled
    Expanding,
    /// Children are available
    Expanded,
}

/// A list item in a navigation tree.
///
/// Implemented for live browser elements and for parsed DOM snapshots, so the
/// same traversal drives both. Lookups that find nothing return `None` or an
/// empty list; they are never errors.
#[allow(async_fn_in_trait)]
pub trait NavItem: Sized {
    /// `href` of the item's own anchor, ignoring anchors in nested lists
    async fn anchor_href(&self) -> Option<String>;

    /// Current expansion state
    async fn state(&self) -> ExpandState;

    /// Issue the expand action; false if it could not be performed
    async fn request_expand(&self) -> bool;

    /// Items of the nested list(s), in document order
    async fn children(&self) -> Vec<Self>;
}

/// Walks a documentation site's navigation and produces its ordered,
/// deduplicated page list
#[derive(Debug)]
pub struct NavigationTraverser {
    filter: LinkFilter,
    nav_css: String,
    nav_selector: Selector,
    settle_timeout: Duration,
    poll_interval: Duration,
    include_start_page: bool,
}

impl NavigationTraverser {
    pub fn new(filter: LinkFilter, nav_selector: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            filter,
            nav_css: nav_selector.to_string(),
            nav_selector: parse_selector(nav_selector)?,
            settle_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(50),
            include_start_page: false,
        })
    }

    /// How long an expanding item may take to settle, and how often it is checked
    pub fn with_expansion_timing(mut self, settle_timeout: Duration, poll_interval: Duration) -> Self {
        self.settle_timeout = settle_timeout;
        self.poll_interval = poll_interval;
        self
    }

    /// Record the start page itself as the first link
    pub fn with_start_page(mut self, include: bool) -> Self {
        self.include_start_page = include;
        self
    }

    /// Navigation root selector as configured
    pub fn nav_css(&self) -> &str {
        &self.nav_css
    }

    /// Fresh collector for a traversal of the page at `base`
    pub fn collector(&self, base: &Url) -> LinkCollector {
        let mut collector = LinkCollector::new(base.clone());
        if self.include_start_page {
            collector.push(crate::filter::canonicalize(base));
        }
        collector
    }

    /// Static mode: fetch the start page and scan its navigation anchors.
    ///
    /// An unreachable start page yields no links.
    pub async fn discover_static(&self, fetcher: &PageFetcher, start: &Url) -> Vec<DiscoveredLink> {
        match fetcher.fetch(start).await {
            Ok(html) => self.scan_static(&html, start),
            Err(e) => {
                ::log::error!("Failed to fetch start page: {}", e);
                Vec::new()
            }
        }
    }

    /// Flat, in-document-order scan of the anchors under the navigation root
    pub fn scan_static(&self, html: &str, base: &Url) -> Vec<DiscoveredLink> {
        let doc = Html::parse_document(html);
        let mut collector = self.collector(base);

        match nav_hrefs(&doc, &self.nav_selector) {
            Some(hrefs) if hrefs.is_empty() => {
                ::log::info!("No links found in the navigation");
            }
            Some(hrefs) => {
                for href in hrefs {
                    collector.offer(&self.filter, href);
                }
            }
            None => {
                ::log::info!("Navigation element '{}' not found", self.nav_css);
            }
        }

        collector.into_links()
    }

    /// Pre-order traversal of an already rendered DOM, with no interaction
    pub async fn discover_snapshot(&self, html: &str, base: &Url) -> Vec<DiscoveredLink> {
        let doc = Html::parse_document(html);
        let Some(nav) = doc.select(&self.nav_selector).next() else {
            ::log::info!("Navigation element '{}' not found", self.nav_css);
            return self.collector(base).into_links();
        };

        self.discover_tree(SnapshotItem::list_items(nav), base).await
    }

    /// Pre-order DFS over `roots`, expanding collapsed items on the way
    pub async fn discover_tree<N: NavItem>(&self, roots: Vec<N>, base: &Url) -> Vec<DiscoveredLink> {
        let mut collector = self.collector(base);
        for root in &roots {
            self.visit(root, &mut collector).await;
        }
        collector.into_links()
    }

    fn visit<'a, N: NavItem + 'a>(
        &'a self,
        item: &'a N,
        collector: &'a mut LinkCollector,
    ) -> LocalBoxFuture<'a, ()> {
        async move {
            if let Some(href) = item.anchor_href().await {
                collector.offer(&self.filter, &href);
            }

            if item.state().await == ExpandState::Collapsed {
                self.expand(item).await;
            }

            for child in item.children().await {
                self.visit(&child, collector).await;
            }
        }
        .boxed_local()
    }

    /// Drives `Collapsed -> Expanding -> Expanded`.
    ///
    /// Returns `Expanding` if the item did not settle within the timeout and
    /// `Collapsed` if the expand action itself failed.
    pub async fn expand<N: NavItem>(&self, item: &N) -> ExpandState {
        if !item.request_expand().await {
            return ExpandState::Collapsed;
        }

        let deadline = Instant::now() + self.settle_timeout;
        loop {
            if item.state().await == ExpandState::Expanded {
                return ExpandState::Expanded;
            }
            if Instant::now() >= deadline {
                ::log::warn!(
                    "Navigation item did not expand within {:?}, continuing",
                    self.settle_timeout
                );
                return ExpandState::Expanding;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// In-memory navigation item. A collapsed item reports `Expanding` after
    /// its click until it has been polled `settles_after` times.
    #[derive(Clone, Default)]
    struct FakeItem {
        href: Option<&'static str>,
        collapsed: bool,
        settles_after: Option<u32>,
        click_fails: bool,
        lazy: bool,
        clicks: Rc<Cell<u32>>,
        polls: Rc<Cell<u32>>,
        children: Vec<FakeItem>,
    }

    impl FakeItem {
        fn is_open(&self) -> bool {
            !self.collapsed
                || (self.clicks.get() > 0
                    && self.settles_after.is_some_and(|n| self.polls.get() >= n))
        }
    }

    impl NavItem for FakeItem {
        async fn anchor_href(&self) -> Option<String> {
            self.href.map(str::to_string)
        }

        async fn state(&self) -> ExpandState {
            if !self.collapsed {
                return ExpandState::Expanded;
            }
            if self.clicks.get() == 0 {
                return ExpandState::Collapsed;
            }
            self.polls.set(self.polls.get() + 1);
            if self.is_open() {
                ExpandState::Expanded
            } else {
                ExpandState::Expanding
            }
        }

        async fn request_expand(&self) -> bool {
            if self.click_fails {
                return false;
            }
            self.clicks.set(self.clicks.get() + 1);
            true
        }

        async fn children(&self) -> Vec<Self> {
            if self.lazy && !self.is_open() {
                return Vec::new();
            }
            self.children.clone()
        }
    }

    fn leaf(href: &'static str) -> FakeItem {
        FakeItem {
            href: Some(href),
            ..FakeItem::default()
        }
    }

    fn group(href: Option<&'static str>, children: Vec<FakeItem>) -> FakeItem {
        FakeItem {
            href,
            children,
            ..FakeItem::default()
        }
    }

    fn base() -> Url {
        Url::parse("https://docs.example.com/start").unwrap()
    }

    fn traverser() -> NavigationTraverser {
        NavigationTraverser::new(LinkFilter::new(vec!["carbonads.net".into()], &[]).unwrap(), "nav")
            .unwrap()
            .with_expansion_timing(Duration::from_millis(60), Duration::from_millis(1))
    }

    fn urls(links: &[DiscoveredLink]) -> Vec<&str> {
        links.iter().map(|l| l.canonical_url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_pre_order() {
        let roots = vec![
            group(
                Some("/a"),
                vec![group(Some("/a/1"), vec![leaf("/a/1/x")]), leaf("/a/2")],
            ),
            leaf("/b"),
        ];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/a",
                "https://docs.example.com/a/1",
                "https://docs.example.com/a/1/x",
                "https://docs.example.com/a/2",
                "https://docs.example.com/b",
            ]
        );
        for (i, link) in links.iter().enumerate() {
            assert_eq!(link.order_index, i);
        }
    }

    #[tokio::test]
    async fn test_fragments_dedup_to_first_position() {
        let roots = vec![leaf("/a#x"), leaf("/b"), leaf("/a#y")];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(
            urls(&links),
            vec!["https://docs.example.com/a", "https://docs.example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_missing_anchor_and_children_are_not_errors() {
        let roots = vec![
            group(None, vec![leaf("/child")]),
            FakeItem::default(),
            leaf("/after"),
        ];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/child",
                "https://docs.example.com/after"
            ]
        );
    }

    #[tokio::test]
    async fn test_skips_fragment_only_and_denylisted() {
        let roots = vec![
            leaf("#"),
            leaf(""),
            leaf("https://srv.carbonads.net/ads/click"),
            group(Some("#"), vec![leaf("/real")]),
        ];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(urls(&links), vec!["https://docs.example.com/real"]);
    }

    #[tokio::test]
    async fn test_collapsed_item_expands_before_children() {
        let clicks = Rc::new(Cell::new(0));
        let roots = vec![
            FakeItem {
                href: Some("/guide"),
                collapsed: true,
                settles_after: Some(3),
                lazy: true,
                clicks: clicks.clone(),
                children: vec![leaf("/guide/one"), leaf("/guide/two")],
                ..FakeItem::default()
            },
            leaf("/next"),
        ];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(clicks.get(), 1);
        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/guide",
                "https://docs.example.com/guide/one",
                "https://docs.example.com/guide/two",
                "https://docs.example.com/next",
            ]
        );
    }

    #[tokio::test]
    async fn test_expand_state_machine() {
        let traverser = traverser();

        let settles = FakeItem {
            collapsed: true,
            settles_after: Some(2),
            ..FakeItem::default()
        };
        assert_eq!(settles.state().await, ExpandState::Collapsed);
        assert_eq!(traverser.expand(&settles).await, ExpandState::Expanded);

        let never = FakeItem {
            collapsed: true,
            settles_after: None,
            ..FakeItem::default()
        };
        let started = std::time::Instant::now();
        assert_eq!(traverser.expand(&never).await, ExpandState::Expanding);
        assert!(started.elapsed() >= Duration::from_millis(60));

        let broken = FakeItem {
            collapsed: true,
            click_fails: true,
            ..FakeItem::default()
        };
        assert_eq!(traverser.expand(&broken).await, ExpandState::Collapsed);
    }

    #[tokio::test]
    async fn test_unsettled_item_children_still_visited() {
        let roots = vec![FakeItem {
            href: Some("/slow"),
            collapsed: true,
            settles_after: None,
            children: vec![leaf("/slow/child")],
            ..FakeItem::default()
        }];

        let links = traverser().discover_tree(roots, &base()).await;

        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/slow",
                "https://docs.example.com/slow/child"
            ]
        );
    }

    #[tokio::test]
    async fn test_start_page_seeds_first_slot() {
        let roots = vec![leaf("/a"), leaf("/start#top")];

        let links = traverser()
            .with_start_page(true)
            .discover_tree(roots, &base())
            .await;

        assert_eq!(
            urls(&links),
            vec!["https://docs.example.com/start", "https://docs.example.com/a"]
        );
    }

    #[test]
    fn test_scan_static() {
        let html = r##"<html><body>
            <nav class="docs"><ul>
                <li><a href="/a#x">A</a></li>
                <li><a href="#">Top</a></li>
                <li><a href="/a#y">A again</a></li>
                <li><a href="/b?tab=1">B</a></li>
            </ul></nav>
        </body></html>"##;
        let traverser = NavigationTraverser::new(LinkFilter::default(), "nav.docs").unwrap();

        let links = traverser.scan_static(html, &base());

        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/a",
                "https://docs.example.com/b?tab=1"
            ]
        );
    }

    #[test]
    fn test_scan_static_without_nav() {
        let traverser = NavigationTraverser::new(LinkFilter::default(), "nav.docs").unwrap();
        assert!(traverser.scan_static("<p>nothing</p>", &base()).is_empty());
    }

    #[tokio::test]
    async fn test_discover_snapshot() {
        let html = r##"<nav class="menu"><ul>
            <li class="menu__list-item">
                <a href="/intro">Intro</a>
            </li>
            <li class="menu__list-item menu__list-item--collapsed">
                <div><a href="#">Providers</a></div>
                <ul style="display: none">
                    <li><a href="/providers/github">GitHub</a></li>
                    <li><a href="/providers/google#setup">Google</a></li>
                </ul>
            </li>
            <li><a href="/intro#again">Intro again</a></li>
        </ul></nav>"##;
        let traverser = NavigationTraverser::new(LinkFilter::default(), "nav.menu").unwrap();

        let links = traverser.discover_snapshot(html, &base()).await;

        assert_eq!(
            urls(&links),
            vec![
                "https://docs.example.com/intro",
                "https://docs.example.com/providers/github",
                "https://docs.example.com/providers/google",
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_and_static_agree_on_ordered_lists() {
        let html = r#"<nav class="menu"><ol>
            <li><a href="/group">Group</a>
                <ol><li><a href="/group/child">Child</a></li></ol>
            </li>
            <li><a href="mailto:team@example.com">Contact</a></li>
            <li><a href="javascript:void(0)">Toggle</a></li>
            <li><a href="/real">Real</a></li>
        </ol></nav>"#;
        let traverser = NavigationTraverser::new(LinkFilter::default(), "nav.menu").unwrap();
        let expected = vec![
            "https://docs.example.com/group",
            "https://docs.example.com/group/child",
            "https://docs.example.com/real",
        ];

        assert_eq!(urls(&traverser.discover_snapshot(html, &base()).await), expected);
        assert_eq!(urls(&traverser.scan_static(html, &base())), expected);
    }

    #[tokio::test]
    async fn test_discover_static_unreachable_start() {
        let fetcher = PageFetcher::new("Mozilla/5.0", Duration::from_secs(2)).unwrap();
        let start = Url::parse("http://127.0.0.1:1/docs").unwrap();

        let links = traverser()
            .with_start_page(true)
            .discover_static(&fetcher, &start)
            .await;

        assert!(links.is_empty());
    }
}
