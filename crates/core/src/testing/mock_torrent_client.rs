//! Mock torrent client and fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::dispatcher::{DispatchError, TorrentFetcher};
use crate::torrent_client::{TorrentClient, TorrentClientError};

/// Mock implementation of the TorrentClient trait.
///
/// Records every accepted magnet link; `set_next_error` makes the next
/// call fail instead.
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    added: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<TorrentClientError>>>,
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Magnet links accepted so far, in order.
    pub async fn added(&self) -> Vec<String> {
        self.added.read().await.clone()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TorrentClientError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_magnet(&self, uri: &str) -> Result<(), TorrentClientError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.added.write().await.push(uri.to_string());
        Ok(())
    }
}

/// Mock implementation of the TorrentFetcher trait.
///
/// Serves configured bytes per URL; unknown URLs fail like a 404.
#[derive(Debug, Default)]
pub struct MockTorrentFetcher {
    content: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockTorrentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_content(&self, url: &str, bytes: Vec<u8>) {
        self.content.write().await.insert(url.to_string(), bytes);
    }

    pub async fn fetched(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.fetched.read().await.len()
    }
}

#[async_trait]
impl TorrentFetcher for MockTorrentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DispatchError> {
        self.fetched.write().await.push(url.to_string());
        self.content
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| DispatchError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404".to_string(),
            })
    }
}
