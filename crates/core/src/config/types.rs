use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root settings, persisted as `settings.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Base URL of the search results page; the quoted query is appended.
    #[serde(default = "default_search_engine")]
    pub search_engine: String,
    /// Attempts per series per run (0 disables searching).
    #[serde(default = "default_retries", deserialize_with = "number_or_string")]
    pub retries: u32,
    /// What `run` does with the resolved downloads.
    #[serde(default)]
    pub action: Action,
    /// Where `download_torrent_files` writes; current directory when unset.
    #[serde(default, deserialize_with = "empty_path_as_none")]
    pub download_folder: Option<PathBuf>,
    /// Remote torrent client receiving magnet links.
    #[serde(default)]
    pub remote_settings: RemoteSettings,
    /// Upper bound for a single search or fetch, in seconds.
    #[serde(default = "default_timeout")]
    pub search_timeout_secs: u32,
    /// Series searched concurrently (1 = strictly sequential).
    #[serde(default = "default_concurrency")]
    pub max_concurrent_series: usize,
    /// Result rows read from a search page.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Append-only log of series that were not found.
    #[serde(default = "default_miss_log_path")]
    pub miss_log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_engine: default_search_engine(),
            retries: default_retries(),
            action: Action::default(),
            download_folder: None,
            remote_settings: RemoteSettings::default(),
            search_timeout_secs: default_timeout(),
            max_concurrent_series: default_concurrency(),
            result_limit: default_result_limit(),
            miss_log_path: default_miss_log_path(),
        }
    }
}

fn default_search_engine() -> String {
    "http://kat.cr/usearch/".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_timeout() -> u32 {
    30
}

fn default_concurrency() -> usize {
    1
}

fn default_result_limit() -> usize {
    5
}

fn default_miss_log_path() -> PathBuf {
    PathBuf::from("log.txt")
}

/// Action performed on the resolved downloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Print the magnet links.
    ShowMagnets,
    /// Push magnet links to the remote client.
    DownloadFromMagnets,
    /// Save `.torrent` files into the download folder.
    #[default]
    DownloadTorrentFiles,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ShowMagnets => "show_magnets",
            Action::DownloadFromMagnets => "download_from_magnets",
            Action::DownloadTorrentFiles => "download_torrent_files",
        }
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show_magnets" => Ok(Action::ShowMagnets),
            "download_from_magnets" => Ok(Action::DownloadFromMagnets),
            "download_torrent_files" => Ok(Action::DownloadTorrentFiles),
            other => Err(format!(
                "unknown action {:?} (expected show_magnets, download_from_magnets or download_torrent_files)",
                other
            )),
        }
    }
}

/// Remote torrent client web endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemoteSettings {
    /// Endpoint accepting `urls=<magnet>` form posts.
    #[serde(default = "default_download_url")]
    pub download_url: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            download_url: default_download_url(),
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_download_url() -> String {
    "http://localhost:8181/command/download".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "adminadmin".to_string()
}

/// Accept `3` as well as `"3"`.
fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// `""` and `null` both mean "not set".
fn empty_path_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<PathBuf>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
}

/// Settings view safe to log (password redacted).
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSettings {
    pub search_engine: String,
    pub retries: u32,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_folder: Option<PathBuf>,
    pub remote_settings: SanitizedRemoteSettings,
    pub search_timeout_secs: u32,
    pub max_concurrent_series: usize,
}

/// Remote client settings with the password hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteSettings {
    pub download_url: String,
    pub username: String,
    pub password_configured: bool,
}

impl From<&Settings> for SanitizedSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            search_engine: settings.search_engine.clone(),
            retries: settings.retries,
            action: settings.action,
            download_folder: settings.download_folder.clone(),
            remote_settings: SanitizedRemoteSettings {
                download_url: settings.remote_settings.download_url.clone(),
                username: settings.remote_settings.username.clone(),
                password_configured: !settings.remote_settings.password.is_empty(),
            },
            search_timeout_secs: settings.search_timeout_secs,
            max_concurrent_series: settings.max_concurrent_series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_original_settings_file() {
        let json = r#"{
            "search_engine": "http://kat.cr/usearch/",
            "retries": "3",
            "action": "download_torrent_files",
            "download_folder": "",
            "remote_settings": {
                "download_url": "http://localhost:8181/command/download",
                "username": "admin",
                "password": "adminadmin"
            }
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.retries, 3);
        assert_eq!(settings.action, Action::DownloadTorrentFiles);
        assert!(settings.download_folder.is_none());
        assert_eq!(settings.search_timeout_secs, 30);
        assert_eq!(settings.max_concurrent_series, 1);
        assert_eq!(settings.result_limit, 5);
        assert_eq!(settings.miss_log_path, PathBuf::from("log.txt"));
    }

    #[test]
    fn test_deserialize_numeric_retries_and_folder() {
        let json = r#"{"retries": 5, "action": "show_magnets", "download_folder": "/data/torrents"}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.retries, 5);
        assert_eq!(settings.action, Action::ShowMagnets);
        assert_eq!(settings.download_folder, Some(PathBuf::from("/data/torrents")));
    }

    #[test]
    fn test_deserialize_bad_retries_fails() {
        let result: Result<Settings, _> = serde_json::from_str(r#"{"retries": "many"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("show_magnets".parse::<Action>().unwrap(), Action::ShowMagnets);
        assert_eq!(
            "download_from_magnets".parse::<Action>().unwrap(),
            Action::DownloadFromMagnets
        );
        assert!("stream".parse::<Action>().is_err());
        assert_eq!(Action::DownloadTorrentFiles.as_str(), "download_torrent_files");
    }

    #[test]
    fn test_sanitized_settings() {
        let settings = Settings::default();
        let sanitized = SanitizedSettings::from(&settings);
        assert!(sanitized.remote_settings.password_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("adminadmin"));
        assert!(!json.contains("download_folder"));
    }
}
