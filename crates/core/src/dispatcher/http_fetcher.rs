//! .torrent downloads over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::searcher::USER_AGENT;

use super::{DispatchError, TorrentFetcher};

/// Fetches torrent files with a plain GET.
pub struct HttpTorrentFetcher {
    client: Client,
}

impl HttpTorrentFetcher {
    pub fn new(timeout_secs: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

#[async_trait]
impl TorrentFetcher for HttpTorrentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DispatchError> {
        let fetch_error = |reason: String| DispatchError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        debug!(url, bytes = bytes.len(), "Fetched torrent file");

        Ok(bytes.to_vec())
    }
}
