//! Types for the retrieval orchestrator.

use serde::Serialize;
use thiserror::Error;

use crate::episode::EpisodeCode;
use crate::selector::ResolvedDownload;

/// Errors that abort a run.
///
/// Search failures never show up here: they only use up an attempt.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Watchlist read or write failed.
    #[error("watchlist error: {0}")]
    Watchlist(#[from] crate::watchlist::WatchlistError),
}

/// Where a series is in its retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Looking for the next episode of the current season.
    SearchingCurrent,
    /// Looking for episode 1 of the following season.
    SearchingNextSeason,
    Resolved,
    Exhausted,
}

impl SearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPhase::SearchingCurrent => "searching_current",
            SearchPhase::SearchingNextSeason => "searching_next_season",
            SearchPhase::Resolved => "resolved",
            SearchPhase::Exhausted => "exhausted",
        }
    }
}

/// Final state of one series after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesOutcome {
    Resolved(ResolvedDownload),
    /// No acceptable release in any attempt; the watchlist is unchanged.
    Exhausted {
        series: String,
        episode: EpisodeCode,
        attempts: u32,
    },
}

impl SeriesOutcome {
    pub fn phase(&self) -> SearchPhase {
        match self {
            SeriesOutcome::Resolved(_) => SearchPhase::Resolved,
            SeriesOutcome::Exhausted { .. } => SearchPhase::Exhausted,
        }
    }
}

/// Result of one orchestration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per resolved series.
    pub resolved: Vec<ResolvedDownload>,
    /// `(series, wanted episode)` of every series left pending.
    pub not_found: Vec<(String, EpisodeCode)>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.not_found.is_empty()
    }
}
