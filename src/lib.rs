// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod stats;

// Re-export commonly used types for convenience
pub use config::{SiteConfig, TraversalMode};
pub use crawlers::{CrawlOrchestrator, NavigationTraverser, Schedule};
pub use error::{FetchError, HarvestError};
pub use fetcher::PageFetcher;
pub use parsers::ContentExtractor;
pub use results::{CrawlResult, DiscoveredLink, PageContent};
pub use stats::CrawlStats;

use std::path::PathBuf;
use url::Url;

use crate::crawlers::WebSession;
use crate::filter::LinkFilter;

/// Main builder for one documentation harvest
pub struct Harvester {
    config: SiteConfig,
}

impl Harvester {
    /// Create a new Harvester for the given site configuration
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// Set the maximum number of concurrent page fetches
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set where the export is written
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.config.output = output.into();
        self
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Static traversal fetches in parallel; interactive traversal keeps the
    /// whole run sequential
    pub fn schedule(&self) -> Schedule {
        match self.config.mode {
            TraversalMode::Static => Schedule::Pool(self.config.max_concurrency.max(1)),
            TraversalMode::Interactive => Schedule::Sequential,
        }
    }

    fn start_url(&self) -> Result<Url, HarvestError> {
        Url::parse(&self.config.start_url).map_err(|source| HarvestError::InvalidUrl {
            url: self.config.start_url.clone(),
            source,
        })
    }

    fn traverser(&self) -> Result<NavigationTraverser, HarvestError> {
        let filter = LinkFilter::new(self.config.denylist.clone(), &self.config.exclude_patterns)?;
        Ok(NavigationTraverser::new(filter, &self.config.nav_selector)?
            .with_expansion_timing(
                self.config.interactive.settle_timeout(),
                self.config.interactive.poll_interval(),
            )
            .with_start_page(self.config.include_start_page))
    }

    /// Enumerate the site's pages in navigation order
    pub async fn discover(&self, fetcher: &PageFetcher) -> Result<Vec<DiscoveredLink>, HarvestError> {
        let start = self.start_url()?;
        let traverser = self.traverser()?;

        let links = match self.config.mode {
            TraversalMode::Static => traverser.discover_static(fetcher, &start).await,
            TraversalMode::Interactive => {
                let webdriver_url = self.config.webdriver_url();
                let session = WebSession::connect(&webdriver_url, self.config.interactive.headless).await?;
                let links = session
                    .discover(&traverser, &start, &self.config.interactive)
                    .await;
                session.close().await;
                links
            }
        };

        ::log::info!("Discovered {} links from {}", links.len(), start);
        Ok(links)
    }

    /// Discover, crawl, export and log. Per-page failures never fail the run.
    pub async fn run(&self) -> Result<CrawlResult, HarvestError> {
        // Validate the content selector before spending time on discovery
        let extractor = ContentExtractor::new(&self.config.content_selector)?;
        let fetcher = PageFetcher::new(&self.config.user_agent, self.config.request_timeout())?;

        let links = self.discover(&fetcher).await?;
        let result = CrawlOrchestrator::new(fetcher, extractor, self.schedule())
            .run(&links)
            .await;

        let written = export::write_export(&self.config.output, &result)?;
        ::log::info!(
            "Wrote {} pages to {}",
            written,
            self.config.output.display()
        );
        export::log_result(&result);

        Ok(result)
    }
}
