//! Watchlist storage trait and errors.

use thiserror::Error;

use crate::episode::EpisodeCode;

use super::types::{DownloadableEntry, Watchlist};

/// Errors from watchlist storage.
#[derive(Debug, Error)]
pub enum WatchlistError {
    /// The series is not tracked. A download was resolved for a name the
    /// orchestrator never read from the store.
    #[error("unknown series: {0}")]
    UnknownSeries(String),

    #[error("watchlist I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed watchlist: {0}")]
    Serialization(String),
}

/// Trait for watchlist storage backends.
///
/// Every mutating call is durable once it returns.
pub trait WatchlistStore: Send + Sync {
    /// Copy of the current watchlist.
    fn snapshot(&self) -> Result<Watchlist, WatchlistError>;

    /// Track `name` with default settings unless already tracked.
    /// Returns true when a new entry was created.
    fn ensure_entry(&self, name: &str) -> Result<bool, WatchlistError>;

    /// Series flagged for download with their next search targets.
    fn downloadable_entries(&self) -> Result<Vec<DownloadableEntry>, WatchlistError>;

    /// Advance a series to `episode` after a successful resolution.
    fn record_download(&self, name: &str, episode: EpisodeCode) -> Result<(), WatchlistError>;
}
