//! Candidate filtering, quality inference and selection.

mod matcher;
mod quality;
mod types;

pub use matcher::{link_series_token, matches_request, CandidateSelector};
pub use quality::{QualityInference, QualityRule, ResolutionTokenRule, SizeBandRule, SD};
pub use types::ResolvedDownload;
