//! JSON-file watchlist store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::episode::EpisodeCode;

use super::store::{WatchlistError, WatchlistStore};
use super::types::{normalize_series_name, DownloadableEntry, Watchlist};

/// Watchlist persisted as a single JSON object.
///
/// The whole file is rewritten on every mutation, through a sibling
/// temporary file renamed over the original.
pub struct JsonWatchlistStore {
    path: PathBuf,
    watchlist: Mutex<Watchlist>,
}

impl JsonWatchlistStore {
    /// Open the store at `path`, creating it from `seeds` when the file does
    /// not exist yet. Seed names missing from an existing file are added.
    pub fn open<S: AsRef<str>>(path: impl Into<PathBuf>, seeds: &[S]) -> Result<Self, WatchlistError> {
        let path = path.into();

        if !path.exists() {
            let watchlist = Watchlist::from_names(seeds);
            write_watchlist(&path, &watchlist)?;
            info!(path = %path.display(), entries = watchlist.len(), "Created watchlist");
            return Ok(Self {
                path,
                watchlist: Mutex::new(watchlist),
            });
        }

        let watchlist = read_watchlist(&path)?;
        debug!(path = %path.display(), entries = watchlist.len(), "Loaded watchlist");
        let store = Self {
            path,
            watchlist: Mutex::new(watchlist),
        };

        for name in seeds {
            store.ensure_entry(name.as_ref())?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Watchlist> {
        // A panic while holding the lock cannot leave a half-written file,
        // so the in-memory copy is still usable.
        self.watchlist
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WatchlistStore for JsonWatchlistStore {
    fn snapshot(&self) -> Result<Watchlist, WatchlistError> {
        Ok(self.lock().clone())
    }

    fn ensure_entry(&self, name: &str) -> Result<bool, WatchlistError> {
        let mut watchlist = self.lock();

        let mut updated = watchlist.clone();
        if !updated.ensure(name) {
            return Ok(false);
        }
        write_watchlist(&self.path, &updated)?;
        *watchlist = updated;

        info!(series = %normalize_series_name(name), "Tracking new series");
        Ok(true)
    }

    fn downloadable_entries(&self) -> Result<Vec<DownloadableEntry>, WatchlistError> {
        Ok(self.lock().downloadable())
    }

    fn record_download(&self, name: &str, episode: EpisodeCode) -> Result<(), WatchlistError> {
        let mut watchlist = self.lock();

        let mut updated = watchlist.clone();
        let entry = updated
            .get_mut(name)
            .ok_or_else(|| WatchlistError::UnknownSeries(name.to_string()))?;
        entry.latest_downloaded_episode = episode;

        write_watchlist(&self.path, &updated)?;
        *watchlist = updated;

        debug!(series = name, episode = %episode, "Recorded download");
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> WatchlistError {
    WatchlistError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn read_watchlist(path: &Path) -> Result<Watchlist, WatchlistError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&content).map_err(|e| WatchlistError::Serialization(e.to_string()))
}

fn write_watchlist(path: &Path, watchlist: &Watchlist) -> Result<(), WatchlistError> {
    let json = serde_json::to_string_pretty(watchlist)
        .map_err(|e| WatchlistError::Serialization(e.to_string()))?;

    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(|e| io_error(&tmp_path, e))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| io_error(&tmp_path, e))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| io_error(path, e))
}
