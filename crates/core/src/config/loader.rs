use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use std::fs;
use std::path::Path;

use tracing::info;

use super::{types::Settings, ConfigError};

/// Prefix of environment overrides, e.g. `TVWATCH_RETRIES=5` or
/// `TVWATCH_REMOTE_SETTINGS__USERNAME=me`.
pub const ENV_PREFIX: &str = "TVWATCH_";

/// Load settings from file with environment variable overrides
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    load_layered(path, Env::prefixed(ENV_PREFIX).split("__"))
}

fn load_layered(path: &Path, env: Env) -> Result<Settings, ConfigError> {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Json::file(path))
        .merge(env)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load settings from a JSON string (useful for testing)
pub fn load_settings_from_str(json: &str) -> Result<Settings, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load settings, writing a default settings file first when none exists.
pub fn load_or_create_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        save_settings(path, &Settings::default())?;
        info!("Created default settings at {:?}", path);
    }
    load_settings(path)
}

/// Persist settings as pretty-printed JSON.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;
    fs::write(path, json).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
}

/// Apply `update` to the settings stored at `path` and write them back.
///
/// Only the file contents are rewritten; environment overrides in effect
/// are not baked into the file. Returns the effective settings, overrides
/// included, as `load_settings` would.
pub fn update_settings<F>(path: &Path, update: F) -> Result<Settings, ConfigError>
where
    F: FnOnce(&mut Settings),
{
    update_settings_with_env(path, Env::prefixed(ENV_PREFIX).split("__"), update)
}

fn update_settings_with_env<F>(path: &Path, env: Env, update: F) -> Result<Settings, ConfigError>
where
    F: FnOnce(&mut Settings),
{
    if !path.exists() {
        save_settings(path, &Settings::default())?;
    }

    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    let mut settings = load_settings_from_str(&content)?;
    update(&mut settings);
    save_settings(path, &settings)?;

    load_layered(path, env)
}
