use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder reported when a representative sentence cannot be found
pub const NOT_AVAILABLE: &str = "not available";

static FIRST_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?[.!?]").expect("first sentence pattern is valid"));

static CAPITALIZED_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^.!?]*[.!?]").expect("sentence pattern is valid"));

/// Aggregate statistics over the extracted texts of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Sum of the character counts of every non-absent text
    pub total_characters: usize,

    /// Leading sentence of the first non-absent text
    pub first_sentence: Option<String>,

    /// Last capitalized sentence of the last non-absent text
    pub last_sentence: Option<String>,
}

impl CrawlStats {
    /// Computes statistics from texts in discovery order. Absent pages must
    /// already be filtered out.
    pub fn from_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut total_characters = 0;
        let mut first: Option<&str> = None;
        let mut last: Option<&str> = None;

        for text in texts {
            total_characters += text.chars().count();
            first.get_or_insert(text);
            last = Some(text);
        }

        Self {
            total_characters,
            first_sentence: first.and_then(first_sentence),
            last_sentence: last.and_then(last_sentence),
        }
    }

    pub fn first_sentence_or_na(&self) -> &str {
        self.first_sentence.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn last_sentence_or_na(&self) -> &str {
        self.last_sentence.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total character count: {}", self.total_characters)?;
        writeln!(f, "First sentence: {}", self.first_sentence_or_na())?;
        write!(f, "Last sentence: {}", self.last_sentence_or_na())
    }
}

/// Text up to and including the first `.`, `!` or `?`
pub fn first_sentence(text: &str) -> Option<String> {
    FIRST_SENTENCE.find(text).map(|m| m.as_str().to_string())
}

/// Last span that starts with a capital letter and ends with sentence punctuation
pub fn last_sentence(text: &str) -> Option<String> {
    CAPITALIZED_SENTENCE
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            first_sentence("Hello world. Second one!").as_deref(),
            Some("Hello world.")
        );
        assert_eq!(first_sentence("no punctuation here"), None);
        assert_eq!(first_sentence("Really? Yes.").as_deref(), Some("Really?"));
    }

    #[test]
    fn test_last_sentence() {
        assert_eq!(
            last_sentence("First part. Then the end!").as_deref(),
            Some("Then the end!")
        );
        // Lowercase tails are not sentences on their own
        assert_eq!(
            last_sentence("Use the hook. see below.").as_deref(),
            Some("Use the hook.")
        );
        assert_eq!(last_sentence("nothing capitalized."), None);
    }

    #[test]
    fn test_empty_input_reports_not_available() {
        let stats = CrawlStats::from_texts(Vec::<&str>::new());
        assert_eq!(stats.total_characters, 0);
        assert_eq!(stats.first_sentence_or_na(), NOT_AVAILABLE);
        assert_eq!(stats.last_sentence_or_na(), NOT_AVAILABLE);
    }

    #[test]
    fn test_uses_first_and_last_texts() {
        let stats = CrawlStats::from_texts(["Intro page. More.", "Middle.", "Last page here. The end."]);
        assert_eq!(stats.first_sentence.as_deref(), Some("Intro page."));
        assert_eq!(stats.last_sentence.as_deref(), Some("The end."));
        assert_eq!(stats.total_characters, 17 + 7 + 24);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let stats = CrawlStats::from_texts(["Café."]);
        assert_eq!(stats.total_characters, 5);
    }

    #[test]
    fn test_display() {
        let stats = CrawlStats::from_texts(["Only one."]);
        let rendered = stats.to_string();
        assert!(rendered.contains("Total character count: 9"));
        assert!(rendered.contains("First sentence: Only one."));
        assert!(rendered.contains("Last sentence: Only one."));
    }
}
