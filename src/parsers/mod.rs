pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

pub use html::{ContentExtractor, clean_content, nav_hrefs, parse_selector};
