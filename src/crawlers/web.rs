use crate::config::InteractiveConfig;
use crate::crawlers::nav::{ExpandState, NavItem, NavigationTraverser};
use crate::error::HarvestError;
use crate::results::DiscoveredLink;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::sync::Arc;
use url::Url;

/// The item's own anchor: a direct child, or inside any non-list child
const OWN_ANCHOR_XPATH: &str = "./a | ./*[not(self::ul) and not(self::ol)]//a";

/// Items of the item's nested list(s)
const LIST_ITEMS_XPATH: &str = "./ul/li | ./ol/li";

/// A single-owner WebDriver session used for interactive navigation traversal
pub struct WebSession {
    client: Client,
}

impl WebSession {
    /// Connects to the WebDriver server, trying common fallback addresses
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, HarvestError> {
        match connect_to_webdriver(webdriver_url, headless).await {
            Some(client) => Ok(Self { client }),
            None => Err(HarvestError::WebDriverUnavailable(webdriver_url.to_string())),
        }
    }

    /// Loads `start` and walks its navigation tree.
    ///
    /// With `expand_collapsed` the live tree is traversed and collapsed items
    /// are clicked open; otherwise the rendered DOM is captured once and
    /// traversed without interaction.
    pub async fn discover(
        &self,
        traverser: &NavigationTraverser,
        start: &Url,
        options: &InteractiveConfig,
    ) -> Vec<DiscoveredLink> {
        if let Err(e) = self.client.goto(start.as_str()).await {
            ::log::error!("Failed to load start page {}: {}", start, e);
            return Vec::new();
        }

        let base = match self.client.current_url().await {
            Ok(url) => url,
            Err(_) => start.clone(),
        };

        if !options.expand_collapsed {
            return match self.client.source().await {
                Ok(html) => traverser.discover_snapshot(&html, &base).await,
                Err(e) => {
                    ::log::error!("Failed to get source for {}: {}", base, e);
                    Vec::new()
                }
            };
        }

        let nav = match self.client.find(Locator::Css(traverser.nav_css())).await {
            Ok(nav) => nav,
            Err(e) => {
                ::log::info!(
                    "Navigation element '{}' not found: {}",
                    traverser.nav_css(),
                    e
                );
                return traverser.collector(&base).into_links();
            }
        };

        let item_options = Arc::new(ItemOptions {
            collapsed_class: options.collapsed_class.clone(),
            toggle_selector: options.toggle_selector.clone(),
        });
        let roots = WebNavItem::list_items(&nav, &item_options).await;
        ::log::debug!("Navigation has {} top-level items", roots.len());

        traverser.discover_tree(roots, &base).await
    }

    /// Ends the browser session
    pub async fn close(self) {
        if let Err(e) = self.client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }
}

fn capabilities(headless: bool) -> serde_json::Map<String, serde_json::Value> {
    let mut caps = serde_json::Map::new();
    if headless {
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--disable-gpu"] }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );
    }
    caps
}

async fn try_connect(url: &str, headless: bool) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));
    builder.connect(url).await
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str, headless: bool) -> Option<Client> {
    // Try to connect to the specified WebDriver URL
    match try_connect(webdriver_url, headless).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!(
                "Failed to connect to WebDriver at {}: {}",
                webdriver_url,
                e
            );
        }
    }

    // If we couldn't connect, try with common alternative URLs
    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // GeckoDriver / Selenium default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = try_connect(url, headless).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}

#[derive(Debug)]
struct ItemOptions {
    collapsed_class: String,
    toggle_selector: Option<String>,
}

/// Navigation item backed by a live browser element
struct WebNavItem {
    element: Element,
    options: Arc<ItemOptions>,
}

impl WebNavItem {
    async fn list_items(element: &Element, options: &Arc<ItemOptions>) -> Vec<Self> {
        match element.find_all(Locator::XPath(LIST_ITEMS_XPATH)).await {
            Ok(items) => items
                .into_iter()
                .map(|element| Self {
                    element,
                    options: Arc::clone(options),
                })
                .collect(),
            Err(e) => {
                ::log::debug!("No nested list items: {}", e);
                Vec::new()
            }
        }
    }
}

impl NavItem for WebNavItem {
    async fn anchor_href(&self) -> Option<String> {
        let anchor = self.element.find(Locator::XPath(OWN_ANCHOR_XPATH)).await.ok()?;
        anchor.attr("href").await.ok().flatten()
    }

    async fn state(&self) -> ExpandState {
        match self.element.attr("class").await {
            Ok(Some(class)) if class.contains(self.options.collapsed_class.as_str()) => {
                ExpandState::Collapsed
            }
            Ok(_) => ExpandState::Expanded,
            Err(e) => {
                // Stale or detached elements have nothing left to expand
                ::log::debug!("Failed to read navigation item class: {}", e);
                ExpandState::Expanded
            }
        }
    }

    async fn request_expand(&self) -> bool {
        let target = match &self.options.toggle_selector {
            Some(selector) => match self.element.find(Locator::Css(selector)).await {
                Ok(toggle) => toggle,
                Err(_) => self.element.clone(),
            },
            None => self.element.clone(),
        };

        match target.click().await {
            Ok(()) => true,
            Err(e) => {
                ::log::warn!("Failed to expand navigation item: {}", e);
                false
            }
        }
    }

    async fn children(&self) -> Vec<Self> {
        Self::list_items(&self.element, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_capabilities() {
        let caps = capabilities(true);
        assert!(caps.contains_key("goog:chromeOptions"));
        assert!(caps.contains_key("moz:firefoxOptions"));
        assert!(capabilities(false).is_empty());
    }
}
