//! Retrieval orchestrator.
//!
//! Turns the watchlist into one resolved download per series per run:
//! - **Search**: next episode, falling back to the next season's opener
//! - **Retry**: bounded, each attempt a fresh search
//! - **Report**: unresolved series go to the miss log

mod config;
mod miss_log;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use miss_log::{not_found_line, FileMissLog, MissLog};
pub use runner::RetrievalOrchestrator;
pub use types::{OrchestratorError, RunReport, SearchPhase, SeriesOutcome};
