//! Carries out the configured action on a run's resolved downloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::Action;
use crate::selector::ResolvedDownload;
use crate::torrent_client::TorrentClient;

use super::{DispatchError, DispatchOutcome, TorrentFetcher};

/// Runs one of the three download actions.
pub struct ActionDispatcher {
    action: Action,
    torrent_client: Arc<dyn TorrentClient>,
    fetcher: Arc<dyn TorrentFetcher>,
    /// Destination of saved .torrent files.
    download_folder: PathBuf,
}

impl ActionDispatcher {
    /// Create a dispatcher. Torrent files go to `download_folder`, or the
    /// current directory when `None`.
    pub fn new(
        action: Action,
        torrent_client: Arc<dyn TorrentClient>,
        fetcher: Arc<dyn TorrentFetcher>,
        download_folder: Option<PathBuf>,
    ) -> Self {
        Self {
            action,
            torrent_client,
            fetcher,
            download_folder: download_folder.unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub async fn dispatch(&self, downloads: &[ResolvedDownload]) -> Result<DispatchOutcome, DispatchError> {
        match self.action {
            Action::ShowMagnets => Ok(DispatchOutcome::Magnets(show_magnets(downloads))),
            Action::DownloadFromMagnets => self.push_magnets(downloads).await,
            Action::DownloadTorrentFiles => self.save_torrent_files(downloads).await,
        }
    }

    async fn push_magnets(&self, downloads: &[ResolvedDownload]) -> Result<DispatchOutcome, DispatchError> {
        let mut pushed = 0;
        for download in downloads.iter().filter(|d| !d.magnet_link.is_empty()) {
            self.torrent_client
                .add_magnet(&download.magnet_link)
                .await
                .map_err(|source| DispatchError::RemoteClient {
                    series: download.series_key(),
                    source,
                })?;
            pushed += 1;
            info!(
                release = %download.series_key(),
                client = self.torrent_client.name(),
                "Pushed magnet link"
            );
        }
        Ok(DispatchOutcome::Pushed(pushed))
    }

    async fn save_torrent_files(&self, downloads: &[ResolvedDownload]) -> Result<DispatchOutcome, DispatchError> {
        if downloads.is_empty() {
            return Ok(DispatchOutcome::Saved(Vec::new()));
        }

        ensure_dir(&self.download_folder).await?;

        let mut saved = Vec::with_capacity(downloads.len());
        for download in downloads {
            let content = self.fetcher.fetch(&download.torrent_url).await?;
            let path = self.download_folder.join(download.torrent_file_name());
            tokio::fs::write(&path, content)
                .await
                .map_err(|source| DispatchError::Io {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), "Saved torrent file");
            saved.push(path);
        }
        Ok(DispatchOutcome::Saved(saved))
    }
}

/// Magnet links, one per line.
pub fn show_magnets(downloads: &[ResolvedDownload]) -> String {
    downloads
        .iter()
        .map(|d| d.magnet_link.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

async fn ensure_dir(dir: &Path) -> Result<(), DispatchError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| DispatchError::Io {
            path: dir.to_path_buf(),
            source,
        })
}
