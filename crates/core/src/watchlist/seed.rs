//! Sources of series names used to seed a watchlist.

use std::fs;
use std::path::Path;

use super::store::WatchlistError;
use super::types::normalize_series_name;

/// Split a comma-separated list ("Breaking Bad,Lost") into watchlist keys.
pub fn names_from_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(normalize_series_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// One watchlist key per entry of `folder`, hidden entries excluded.
///
/// Typically a media library folder holding one directory per series.
pub fn names_from_folder(folder: &Path) -> Result<Vec<String>, WatchlistError> {
    let io_error = |source: std::io::Error| WatchlistError::Io {
        path: folder.display().to_string(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(folder).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let key = normalize_series_name(name);
        if !key.is_empty() {
            names.push(key);
        }
    }
    names.sort();

    Ok(names)
}
