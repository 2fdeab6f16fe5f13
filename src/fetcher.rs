use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::error::{FetchError, HarvestError};

/// Retrieves raw page documents over one shared HTTP client.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Builds the client once with fixed headers and timeouts
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(HarvestError::HttpClient)?;
        Ok(Self { client })
    }

    /// Fetch the body of `url`. Transport errors and non-success statuses come
    /// back as [`FetchError`] values.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        ::log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
