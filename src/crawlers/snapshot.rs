use scraper::ElementRef;

use crate::crawlers::nav::{ExpandState, NavItem};

/// Navigation item backed by a parsed DOM snapshot.
///
/// A rendered snapshot already contains the children of collapsed groups
/// (they are only hidden by style), so every item reports `Expanded` and
/// expansion never needs an action.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotItem<'a> {
    element: ElementRef<'a>,
}

impl<'a> SnapshotItem<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// `li` elements of the `ul`/`ol` lists directly under `element`
    pub fn list_items(element: ElementRef<'a>) -> Vec<Self> {
        child_elements(element)
            .filter(|child| is_list(child.value().name()))
            .flat_map(child_elements)
            .filter(|item| item.value().name() == "li")
            .map(Self::new)
            .collect()
    }
}

fn is_list(name: &str) -> bool {
    matches!(name, "ul" | "ol")
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// First anchor under `element` that is not inside a nested list
fn own_anchor<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    for child in child_elements(element) {
        match child.value().name() {
            "a" => return Some(child),
            name if is_list(name) => continue,
            _ => {
                if let Some(anchor) = own_anchor(child) {
                    return Some(anchor);
                }
            }
        }
    }
    None
}

impl NavItem for SnapshotItem<'_> {
    async fn anchor_href(&self) -> Option<String> {
        own_anchor(self.element)
            .and_then(|anchor| anchor.value().attr("href"))
            .map(str::to_string)
    }

    async fn state(&self) -> ExpandState {
        ExpandState::Expanded
    }

    async fn request_expand(&self) -> bool {
        true
    }

    async fn children(&self) -> Vec<Self> {
        Self::list_items(self.element)
    }
}
