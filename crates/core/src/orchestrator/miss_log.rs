//! Log of series that could not be resolved.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing::warn;

/// Sink for "not found" notices. Recording never fails the caller.
pub trait MissLog: Send + Sync {
    fn record(&self, line: &str);
}

/// Appends `"<line> - dd/mm/YYYY (HH:MM:SS)"` lines to a text file.
pub struct FileMissLog {
    path: PathBuf,
}

impl FileMissLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MissLog for FileMissLog {
    fn record(&self, line: &str) {
        let stamped = format!("{} - {}\n", line, Local::now().format("%d/%m/%Y (%H:%M:%S)"));

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(stamped.as_bytes()));

        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to write miss log");
        }
    }
}

/// Line recorded for a series left pending.
pub fn not_found_line(series: &str, episode: impl std::fmt::Display) -> String {
    format!("{} - {} (may be quality) not found", series, episode)
}
