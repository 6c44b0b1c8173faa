use super::{types::Action, types::Settings, ConfigError};

/// Validate settings
/// Currently validates:
/// - Search engine URL is set
/// - Remote client URL is set when magnets are pushed
/// - Concurrency and result limit are at least 1
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.search_engine.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "search_engine cannot be empty".to_string(),
        ));
    }

    if settings.action == Action::DownloadFromMagnets
        && settings.remote_settings.download_url.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "remote_settings.download_url is required for download_from_magnets".to_string(),
        ));
    }

    if settings.max_concurrent_series == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent_series cannot be 0".to_string(),
        ));
    }

    if settings.result_limit == 0 {
        return Err(ConfigError::ValidationError(
            "result_limit cannot be 0".to_string(),
        ));
    }

    Ok(())
}
