//! Types for torrent client operations.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Remote client rejected the request with HTTP {status}")]
    Rejected { status: u16 },

    #[error("Invalid client URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout")]
    Timeout,
}

impl From<reqwest::Error> for TorrentClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TorrentClientError::Timeout
        } else {
            TorrentClientError::ConnectionFailed(e.to_string())
        }
    }
}

/// Trait for remote torrent clients.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Hand a magnet link to the client. Any non-2xx answer is an error.
    async fn add_magnet(&self, uri: &str) -> Result<(), TorrentClientError>;
}
