//! Release search abstraction.
//!
//! This module provides a `CandidateSource` trait returning the raw release
//! rows found for one series episode, and an HTML results-page backend.

mod html;
mod types;

pub use html::{parse_results_page, HtmlSearcher, USER_AGENT};
pub use types::*;
