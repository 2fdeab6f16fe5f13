use clap::{Parser, ValueEnum};
use docs_harvest::config::PRESETS;
use docs_harvest::{HarvestError, SiteConfig, TraversalMode};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docs-harvest")]
#[command(about = "Harvests the text of a documentation site into a single export file")]
#[command(version)]
pub struct Args {
    /// Start page whose navigation lists the site's pages
    pub start_url: Option<String>,

    /// JSON site configuration file
    #[arg(short = 'f', long)]
    pub config: Option<PathBuf>,

    /// Built-in site configuration (nextjs, react, nextauth)
    #[arg(short, long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// CSS selector of the navigation root
    #[arg(long)]
    pub nav_selector: Option<String>,

    /// CSS selector of the main content container
    #[arg(long)]
    pub content_selector: Option<String>,

    /// Navigation traversal mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Number of concurrent page fetches
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Export file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip links containing this substring (repeatable)
    #[arg(long = "deny")]
    pub deny: Vec<String>,

    /// WebDriver URL for interactive mode
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Crawl the start page itself first
    #[arg(long)]
    pub include_start_page: bool,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Static,
    Interactive,
}

impl From<ModeArg> for TraversalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Static => TraversalMode::Static,
            ModeArg::Interactive => TraversalMode::Interactive,
        }
    }
}

impl Args {
    /// Builds the site configuration: config file or preset first, then
    /// command-line overrides on top
    pub fn to_config(&self) -> Result<SiteConfig, HarvestError> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => SiteConfig::from_file(path)?,
            (None, Some(name)) => SiteConfig::preset(name)?,
            (None, None) => {
                let start_url = self
                    .start_url
                    .as_deref()
                    .ok_or(HarvestError::MissingSetting("start URL"))?;
                let nav_selector = self
                    .nav_selector
                    .as_deref()
                    .ok_or(HarvestError::MissingSetting("--nav-selector"))?;
                let content_selector = self
                    .content_selector
                    .as_deref()
                    .ok_or(HarvestError::MissingSetting("--content-selector"))?;
                SiteConfig::new(start_url, nav_selector, content_selector)
            }
        };

        if let Some(start_url) = &self.start_url {
            config.start_url = start_url.clone();
        }
        if let Some(nav_selector) = &self.nav_selector {
            config.nav_selector = nav_selector.clone();
        }
        if let Some(content_selector) = &self.content_selector {
            config.content_selector = content_selector.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.interactive.webdriver_url = webdriver_url.clone();
        }
        if self.include_start_page {
            config.include_start_page = true;
        }
        config.denylist.extend(self.deny.iter().cloned());

        Ok(config)
    }
}

/// Help text listing the built-in presets
pub fn presets_help() -> String {
    format!("Available presets: {}", PRESETS.join(", "))
}
