use scraper::{ElementRef, Html, Node, Selector};
use std::borrow::Cow;

use crate::error::HarvestError;
use crate::parsers::text;

/// Elements whose text is never readable page content
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Parse a CSS selector from configuration
pub fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Locates a site's main content container and flattens it to clean text
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    selector: Selector,
}

impl ContentExtractor {
    pub fn new(content_selector: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            selector: parse_selector(content_selector)?,
        })
    }

    /// Parses `html` and extracts the content container's text.
    ///
    /// Returns `None` when no element matches the content selector, or when
    /// the matching element holds no text at all.
    pub fn extract(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        self.extract_from(&doc)
    }

    pub fn extract_from(&self, doc: &Html) -> Option<String> {
        let Some(container) = doc.select(&self.selector).next() else {
            ::log::debug!("Content container not found");
            return None;
        };

        let content = clean_content(container);
        if content.is_empty() {
            ::log::debug!("Content container holds no text");
            return None;
        }
        Some(content)
    }
}

/// Flattens an element into a single line, fencing every `code` element in
/// triple backticks at its reading position.
pub fn clean_content(container: ElementRef<'_>) -> String {
    let mut nodes = Vec::new();
    collect_text_nodes(container, &mut nodes);
    text::join_text_nodes(nodes)
}

fn collect_text_nodes<'a>(element: ElementRef<'a>, out: &mut Vec<Cow<'a, str>>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push(Cow::Borrowed(&**text)),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if name == "code" {
                    // The whole code subtree becomes one node; nested code is not fenced again
                    let code = child.text().collect::<String>();
                    out.push(Cow::Owned(text::fence_code(&code)));
                } else if !SKIPPED_ELEMENTS.contains(&name) {
                    collect_text_nodes(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Raw `href` values of every anchor under the first element matching
/// `nav_selector`, in document order. `None` if there is no such element.
pub fn nav_hrefs<'a>(doc: &'a Html, nav_selector: &Selector) -> Option<Vec<&'a str>> {
    let link_selector = Selector::parse("a[href]").expect("anchor selector is valid");
    let nav = doc.select(nav_selector).next()?;

    let links = nav
        .select(&link_selector)
        .filter_map(|e| e.value().attr("href"))
        .collect::<Vec<_>>();

    ::log::debug!("Navigation holds {} anchors", links.len());
    Some(links)
}
