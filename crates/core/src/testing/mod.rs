//! Testing utilities and mock implementations.
//!
//! Mocks for every external seam (search backend, remote client, torrent
//! download, watchlist file, miss log) so whole runs can be exercised
//! without network or disk, plus a scripted local HTTP server for the
//! real HTTP backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use tvwatch_core::testing::{fixtures, MemoryWatchlistStore, MockCandidateSource};
//!
//! let store = MemoryWatchlistStore::with_watchlist(Watchlist::from_names(["Lost"]));
//! let source = MockCandidateSource::new();
//! source.set_results(vec![fixtures::sd_candidate("Lost", "S01E01")]).await;
//! ```

mod memory;
mod mock_source;
mod mock_torrent_client;
mod stub_server;

pub use memory::{MemoryMissLog, MemoryWatchlistStore};
pub use mock_source::MockCandidateSource;
pub use mock_torrent_client::{MockTorrentClient, MockTorrentFetcher};
pub use stub_server::{StubHttpServer, StubRequest, StubResponse};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::episode::EpisodeCode;
    use crate::searcher::RawCandidate;
    use crate::selector::{link_series_token, ResolvedDownload};

    fn info_hash(seed: &str) -> String {
        format!("{:x}", md5::compute(seed.as_bytes())).to_uppercase()
    }

    /// Create a raw candidate with the given magnet link and reasonable defaults.
    pub fn raw_candidate(series: &str, episode: &str, magnet: &str) -> RawCandidate {
        RawCandidate {
            matched_name: series.to_string(),
            matched_episode: episode.to_string(),
            magnet_link: magnet.to_string(),
            torrent_file_link: format!("//torcache.net/torrent/{}.torrent", info_hash(magnet)),
            page_link: format!("/{}-{}-t{}.html", series.to_lowercase(), episode.to_lowercase(), 1000),
            size_mb: 350.0,
            seeds: 120,
            inferred_quality: None,
        }
    }

    /// A standard-definition release: SD-band size, no resolution token.
    pub fn sd_candidate(series: &str, episode: &str) -> RawCandidate {
        let seed = format!("{}.{}.hdtv", series, episode);
        let magnet = format!(
            "magnet:?xt=urn:btih:{}&dn={}+{}+hdtv",
            info_hash(&seed),
            link_series_token(series),
            episode.to_lowercase()
        );
        raw_candidate(series, episode, &magnet)
    }

    /// A high-definition release carrying a resolution tag like "720p".
    pub fn hd_candidate(series: &str, episode: &str, tag: &str) -> RawCandidate {
        let seed = format!("{}.{}.{}", series, episode, tag);
        let magnet = format!(
            "magnet:?xt=urn:btih:{}&dn={}+{}+{}+hdtv",
            info_hash(&seed),
            link_series_token(series),
            episode.to_lowercase(),
            tag
        );
        let mut candidate = raw_candidate(series, episode, &magnet);
        candidate.size_mb = 1200.0;
        candidate
    }

    /// A resolved SD download as produced by selection.
    pub fn resolved_download(series: &str, episode: &str) -> ResolvedDownload {
        let candidate = sd_candidate(series, episode);
        ResolvedDownload {
            series: series.to_string(),
            episode: EpisodeCode::parse(episode).expect("fixture episode code"),
            magnet_link: candidate.magnet_link,
            torrent_url: format!("http:{}", candidate.torrent_file_link),
        }
    }
}
