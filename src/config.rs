use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::HarvestError;

/// How the navigation tree is enumerated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalMode {
    /// Navigation is present in the server-rendered markup
    #[default]
    Static,
    /// Navigation is rendered in a browser and some groups start collapsed
    Interactive,
}

/// Configuration for one documentation site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page the navigation tree is read from
    pub start_url: String,

    /// Static scan or browser-driven traversal
    #[serde(default)]
    pub mode: TraversalMode,

    /// CSS selector of the navigation root
    pub nav_selector: String,

    /// CSS selector of the main content container on every page
    pub content_selector: String,

    /// Links containing any of these substrings are skipped
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    /// Regex patterns for links to skip
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Maximum number of concurrent page fetches (static mode)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Put the start page itself first in the crawl
    #[serde(default)]
    pub include_start_page: bool,

    /// Path of the newline-delimited export
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Browser settings, used in interactive mode only
    #[serde(default)]
    pub interactive: InteractiveConfig,
}

/// Settings for browser-driven navigation traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Class substring marking a collapsed navigation item
    #[serde(default = "default_collapsed_class")]
    pub collapsed_class: String,

    /// Element inside an item to click for expansion; the item itself when unset
    #[serde(default)]
    pub toggle_selector: Option<String>,

    /// How long an expansion may take before traversal moves on
    #[serde(default = "default_settle_timeout_ms")]
    pub settle_timeout_ms: u64,

    /// How often an expanding item is re-checked
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Click collapsed items open; when false, traverse the rendered DOM as is
    #[serde(default = "default_expand_collapsed")]
    pub expand_collapsed: bool,

    /// Ask the browser to run without a window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_denylist() -> Vec<String> {
    vec!["carbonads.net".to_string()]
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_output() -> PathBuf {
    PathBuf::from("export.txt")
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_collapsed_class() -> String {
    "collapsed".to_string()
}

fn default_settle_timeout_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_expand_collapsed() -> bool {
    true
}

fn default_headless() -> bool {
    true
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            collapsed_class: default_collapsed_class(),
            toggle_selector: None,
            settle_timeout_ms: default_settle_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            expand_collapsed: default_expand_collapsed(),
            headless: default_headless(),
        }
    }
}

impl InteractiveConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Names accepted by [`SiteConfig::preset`]
pub const PRESETS: &[&str] = &["nextjs", "react", "nextauth"];

impl SiteConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str, nav_selector: &str, content_selector: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            mode: TraversalMode::default(),
            nav_selector: nav_selector.to_string(),
            content_selector: content_selector.to_string(),
            denylist: default_denylist(),
            exclude_patterns: Vec::new(),
            max_concurrency: default_max_concurrency(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            include_start_page: false,
            output: default_output(),
            interactive: InteractiveConfig::default(),
        }
    }

    /// Built-in configuration for a known documentation site
    pub fn preset(name: &str) -> Result<Self, HarvestError> {
        let config = match name {
            "nextjs" => Self {
                include_start_page: true,
                ..Self::new(
                    "https://nextjs.org/docs",
                    "nav.docs-scrollbar",
                    "div.prose.prose-vercel.max-w-none",
                )
            },
            "react" => Self {
                include_start_page: true,
                ..Self::new(
                    "https://react.dev/learn",
                    r#"nav[role="navigation"]"#,
                    "article",
                )
            },
            "nextauth" => Self {
                mode: TraversalMode::Interactive,
                ..Self::new(
                    "https://next-auth.js.org/getting-started/introduction",
                    "nav.menu",
                    "div.theme-doc-markdown.markdown",
                )
            },
            other => {
                return Err(HarvestError::UnknownPreset(
                    other.to_string(),
                    PRESETS.join(", "),
                ));
            }
        };
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarvestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| HarvestError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, HarvestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// WebDriver URL, overridden by `WEBDRIVER_URL` when that is set
    pub fn webdriver_url(&self) -> String {
        match std::env::var("WEBDRIVER_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => self.interactive.webdriver_url.clone(),
        }
    }
}
