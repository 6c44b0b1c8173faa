pub mod config;
pub mod dispatcher;
pub mod episode;
pub mod orchestrator;
pub mod searcher;
pub mod selector;
pub mod testing;
pub mod torrent_client;
pub mod watchlist;

pub use config::{
    load_or_create_settings, load_settings, load_settings_from_str, save_settings,
    update_settings, validate_settings, Action, ConfigError, RemoteSettings, SanitizedSettings,
    Settings,
};
pub use dispatcher::{ActionDispatcher, DispatchError, DispatchOutcome, HttpTorrentFetcher};
pub use episode::{EpisodeCode, EpisodeError};
pub use orchestrator::{
    FileMissLog, MissLog, OrchestratorConfig, OrchestratorError, RetrievalOrchestrator, RunReport,
};
pub use searcher::{CandidateSource, HtmlSearcher, RawCandidate, SearchError, SearchRequest};
pub use selector::{CandidateSelector, ResolvedDownload};
pub use torrent_client::{QBittorrentClient, TorrentClient, TorrentClientError};
pub use watchlist::{JsonWatchlistStore, Watchlist, WatchlistEntry, WatchlistError, WatchlistStore};
