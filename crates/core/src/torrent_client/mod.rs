//! Torrent client abstraction.
//!
//! This module provides a `TorrentClient` trait for handing magnet links to
//! a remote client, and a qBittorrent Web UI implementation.

mod digest;
mod qbittorrent;
mod types;

pub use digest::DigestChallenge;
pub use qbittorrent::QBittorrentClient;
pub use types::*;
