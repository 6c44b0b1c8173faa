//! Types for the action dispatcher.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::torrent_client::TorrentClientError;

/// Errors raised while carrying out an action.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The remote client refused or could not take a magnet link.
    #[error("remote client error for {series}: {source}")]
    RemoteClient {
        series: String,
        #[source]
        source: TorrentClientError,
    },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What an action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Newline-joined magnet links.
    Magnets(String),
    /// Number of magnet links accepted by the remote client.
    Pushed(usize),
    /// Torrent files written, in input order.
    Saved(Vec<PathBuf>),
}

/// Downloads the contents of a .torrent URL.
#[async_trait]
pub trait TorrentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DispatchError>;
}
