//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Settings;

/// Configuration for the retrieval orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Attempts per series per run. 0 reports every series as not found
    /// without searching.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Series searched at the same time (1 = one after another).
    /// Attempts for a single series are always sequential.
    #[serde(default = "default_concurrency")]
    pub max_concurrent_series: usize,

    /// Upper bound for one search call (milliseconds). A search running
    /// longer counts as a failed attempt.
    #[serde(default = "default_search_timeout")]
    pub search_timeout_ms: u64,
}

fn default_retries() -> u32 {
    3
}

fn default_concurrency() -> usize {
    1
}

fn default_search_timeout() -> u64 {
    30_000 // 30 seconds
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            max_concurrent_series: default_concurrency(),
            search_timeout_ms: default_search_timeout(),
        }
    }
}

impl OrchestratorConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

impl From<&Settings> for OrchestratorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            retries: settings.retries,
            max_concurrent_series: settings.max_concurrent_series.max(1),
            search_timeout_ms: settings.search_timeout_secs as u64 * 1000,
        }
    }
}
