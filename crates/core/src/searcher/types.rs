//! Types for the release search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::episode::EpisodeCode;

/// One search submitted to a candidate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Watchlist key of the series ("Breaking.Bad").
    pub series: String,
    /// Episode being looked for.
    pub episode: EpisodeCode,
}

impl SearchRequest {
    pub fn new(series: impl Into<String>, episode: EpisodeCode) -> Self {
        Self {
            series: series.into(),
            episode,
        }
    }

    /// Free-text query, e.g. `"Breaking.Bad.S01E01"` (quotes included).
    pub fn query(&self) -> String {
        format!("\"{}.{}\"", self.series, self.episode)
    }
}

/// A release row as parsed from a results page, before filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Series name the row was returned for.
    pub matched_name: String,
    /// Episode token the row was returned for ("S01E01").
    pub matched_episode: String,
    /// Magnet URI. Also the identifying link used for matching.
    pub magnet_link: String,
    /// Link to the .torrent file, possibly scheme-relative.
    pub torrent_file_link: String,
    /// Link to the release page.
    pub page_link: String,
    /// Size in megabytes.
    pub size_mb: f64,
    pub seeds: u32,
    /// Filled in by quality inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_quality: Option<String>,
}

/// Errors that can occur during search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to parse results page: {0}")]
    Parse(String),
}

impl SearchError {
    /// Short failure class for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::ConnectionFailed(_) => "network",
            SearchError::HttpStatus { .. } => "http_status",
            SearchError::Timeout => "timeout",
            SearchError::Parse(_) => "parse",
        }
    }

    pub fn is_network(&self) -> bool {
        !matches!(self, SearchError::Parse(_))
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if let Some(status) = e.status() {
            SearchError::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            SearchError::ConnectionFailed(e.to_string())
        }
    }
}

/// Trait for release search backends.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search releases for one series episode. An empty result is not an error.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawCandidate>, SearchError>;
}
