//! Types produced by candidate selection.

use serde::{Deserialize, Serialize};

use crate::episode::EpisodeCode;

/// The one release chosen for a series in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDownload {
    /// Watchlist key of the series that advances.
    pub series: String,
    /// Episode the release contains.
    pub episode: EpisodeCode,
    /// Magnet URI (may be empty if the index did not provide one).
    pub magnet_link: String,
    /// Absolute URL of the .torrent file.
    pub torrent_url: String,
}

impl ResolvedDownload {
    /// Release name used as the torrent file stem, e.g. `Breaking.Bad.S01E01`.
    pub fn series_key(&self) -> String {
        format!("{}.{}", self.series, self.episode)
    }

    /// File name under which the .torrent is saved.
    pub fn torrent_file_name(&self) -> String {
        format!("{}.torrent", self.series_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_key_and_file_name() {
        let download = ResolvedDownload {
            series: "Breaking.Bad".to_string(),
            episode: EpisodeCode::parse("S02E03").unwrap(),
            magnet_link: "magnet:?xt=urn:btih:abc".to_string(),
            torrent_url: "http://torcache.net/abc.torrent".to_string(),
        };
        assert_eq!(download.series_key(), "Breaking.Bad.S02E03");
        assert_eq!(download.torrent_file_name(), "Breaking.Bad.S02E03.torrent");
    }
}
