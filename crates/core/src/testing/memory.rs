//! In-memory watchlist store and miss log for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::episode::EpisodeCode;
use crate::orchestrator::MissLog;
use crate::watchlist::{
    normalize_series_name, DownloadableEntry, Watchlist, WatchlistEntry, WatchlistError,
    WatchlistStore,
};

/// Watchlist kept in memory, counting successful writes.
#[derive(Debug, Default)]
pub struct MemoryWatchlistStore {
    watchlist: Mutex<Watchlist>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watchlist(watchlist: Watchlist) -> Self {
        Self {
            watchlist: Mutex::new(watchlist),
            ..Self::default()
        }
    }

    /// Insert or replace an entry without counting a write.
    pub fn insert(&self, name: &str, entry: WatchlistEntry) {
        self.watchlist.lock().unwrap().insert(name, entry);
    }

    /// Number of successful mutating calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every mutation fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), WatchlistError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WatchlistError::Io {
                path: "<memory>".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        Ok(())
    }
}

impl WatchlistStore for MemoryWatchlistStore {
    fn snapshot(&self) -> Result<Watchlist, WatchlistError> {
        Ok(self.watchlist.lock().unwrap().clone())
    }

    fn ensure_entry(&self, name: &str) -> Result<bool, WatchlistError> {
        let mut watchlist = self.watchlist.lock().unwrap();
        if watchlist.contains(&normalize_series_name(name)) {
            return Ok(false);
        }
        self.check_writable()?;
        let inserted = watchlist.ensure(name);
        if inserted {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(inserted)
    }

    fn downloadable_entries(&self) -> Result<Vec<DownloadableEntry>, WatchlistError> {
        Ok(self.watchlist.lock().unwrap().downloadable())
    }

    fn record_download(&self, name: &str, episode: EpisodeCode) -> Result<(), WatchlistError> {
        let mut watchlist = self.watchlist.lock().unwrap();
        self.check_writable()?;
        let entry = watchlist
            .get_mut(name)
            .ok_or_else(|| WatchlistError::UnknownSeries(name.to_string()))?;
        entry.latest_downloaded_episode = episode;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Miss log collecting lines without timestamps.
#[derive(Debug, Default)]
pub struct MemoryMissLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryMissLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl MissLog for MemoryMissLog {
    fn record(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
