//! Types for the tracked-series watchlist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::episode::EpisodeCode;

/// Quality tag given to newly tracked series.
pub const DEFAULT_QUALITY: &str = "SD";

/// Tracking state of a single series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Whether the series takes part in runs.
    #[serde(rename = "download")]
    pub download_enabled: bool,
    /// Exact quality tag a release must carry ("SD", "720p", "1080p"...).
    #[serde(rename = "quality")]
    pub desired_quality: String,
    /// Last episode handed to a download action.
    #[serde(rename = "latest-downloaded-episode")]
    pub latest_downloaded_episode: EpisodeCode,
}

impl Default for WatchlistEntry {
    fn default() -> Self {
        Self {
            download_enabled: true,
            desired_quality: DEFAULT_QUALITY.to_string(),
            latest_downloaded_episode: EpisodeCode::START,
        }
    }
}

/// Series name to tracking state. Serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist {
    entries: BTreeMap<String, WatchlistEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a watchlist with a default entry for every name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut watchlist = Self::new();
        for name in names {
            watchlist.ensure(name.as_ref());
        }
        watchlist
    }

    pub fn get(&self, name: &str) -> Option<&WatchlistEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut WatchlistEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Insert a default entry under the normalized form of `name` unless
    /// it is already tracked. Returns true when an entry was inserted.
    pub fn ensure(&mut self, name: &str) -> bool {
        let key = normalize_series_name(name);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, WatchlistEntry::default());
        true
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: WatchlistEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WatchlistEntry)> {
        self.entries.iter()
    }

    /// Entries flagged for download, with their next search targets.
    pub fn downloadable(&self) -> Vec<DownloadableEntry> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.download_enabled)
            .map(|(name, entry)| DownloadableEntry {
                name: name.clone(),
                quality: entry.desired_quality.clone(),
                next_episode: entry.latest_downloaded_episode.advance_episode(),
                next_season_opener: entry.latest_downloaded_episode.first_of_next_season(),
            })
            .collect()
    }
}

/// A series ready to be searched, as read by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadableEntry {
    pub name: String,
    pub quality: String,
    pub next_episode: EpisodeCode,
    pub next_season_opener: EpisodeCode,
}

/// Turn a display name ("Breaking Bad") into a watchlist key ("Breaking.Bad").
pub fn normalize_series_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(".")
}
