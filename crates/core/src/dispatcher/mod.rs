//! Actions run on the resolved downloads: print magnets, push them to a
//! remote client, or save .torrent files.

mod http_fetcher;
mod runner;
mod types;

pub use http_fetcher::HttpTorrentFetcher;
pub use runner::{show_magnets, ActionDispatcher};
pub use types::*;
