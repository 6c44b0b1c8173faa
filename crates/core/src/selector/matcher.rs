//! Candidate filtering and selection.

use tracing::debug;

use crate::searcher::{RawCandidate, SearchRequest};

use super::quality::QualityInference;
use super::types::ResolvedDownload;

/// Scheme added to scheme-relative torrent links (`//host/file.torrent`).
const TORRENT_LINK_SCHEME: &str = "http:";

/// Filters raw candidates down to the ones for the requested episode and
/// picks the first with the wanted quality.
pub struct CandidateSelector {
    inference: QualityInference,
}

impl CandidateSelector {
    /// Create a selector with the default quality rules.
    pub fn new() -> Self {
        Self {
            inference: QualityInference::default(),
        }
    }

    /// Create a selector with custom quality rules.
    pub fn with_inference(inference: QualityInference) -> Self {
        Self { inference }
    }

    /// Fill in `inferred_quality` on every candidate.
    pub fn normalize(&self, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        candidates
            .into_iter()
            .map(|mut c| {
                c.inferred_quality = self.inference.infer(&c);
                c
            })
            .collect()
    }

    /// Normalized candidates that belong to the requested series episode,
    /// in input order.
    pub fn filter(&self, request: &SearchRequest, candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
        self.normalize(candidates)
            .into_iter()
            .filter(|c| matches_request(request, c))
            .collect()
    }

    /// First matching candidate whose quality is exactly `quality`.
    ///
    /// Returns `None` when nothing qualifies; other qualities never stand in.
    pub fn select(
        &self,
        request: &SearchRequest,
        candidates: Vec<RawCandidate>,
        quality: &str,
    ) -> Option<ResolvedDownload> {
        let total = candidates.len();
        let matching = self.filter(request, candidates);

        let chosen = matching
            .into_iter()
            .find(|c| c.inferred_quality.as_deref() == Some(quality));

        debug!(
            series = %request.series,
            episode = %request.episode,
            quality,
            total,
            selected = chosen.is_some(),
            "Selection complete"
        );

        chosen.map(|c| ResolvedDownload {
            series: request.series.clone(),
            episode: request.episode,
            torrent_url: absolute_torrent_url(&c.torrent_file_link),
            magnet_link: c.magnet_link,
        })
    }
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Series name as it appears inside a magnet link: `Breaking.Bad` and
/// `Breaking Bad` both become `breaking+bad`.
pub fn link_series_token(series: &str) -> String {
    series.replace(['.', ' '], "+").to_lowercase()
}

/// True when the candidate's magnet link names both the series and the
/// episode of the request.
pub fn matches_request(request: &SearchRequest, candidate: &RawCandidate) -> bool {
    let link = &candidate.magnet_link;
    let series_match = link.contains(&link_series_token(&request.series));
    let episode_match = link.contains(&request.episode.to_string().to_lowercase());
    series_match && episode_match
}

fn absolute_torrent_url(link: &str) -> String {
    if link.starts_with("//") {
        format!("{}{}", TORRENT_LINK_SCHEME, link)
    } else {
        link.to_string()
    }
}
