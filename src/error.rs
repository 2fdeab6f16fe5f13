use thiserror::Error;

/// A single page could not be retrieved. Recorded per page, never fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, timeout or body read failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Errors that prevent a harvest from starting or finishing
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("unknown preset '{0}' (available: {1})")]
    UnknownPreset(String, String),

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid start URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid exclude pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("no WebDriver server reachable at {0} or any fallback address")]
    WebDriverUnavailable(String),

    #[error("failed to write export {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
