//! Quality inference rules.
//!
//! Index pages rarely state a release's quality explicitly. Rules are tried
//! in order and the first one that recognizes a candidate decides its tag.

use std::ops::RangeInclusive;

use regex_lite::Regex;

use crate::searcher::RawCandidate;

/// Tag given to standard-definition releases.
pub const SD: &str = "SD";

/// A single way of recognizing a candidate's quality.
pub trait QualityRule: Send + Sync {
    /// Rule name for logging.
    fn name(&self) -> &str;

    /// Quality tag, or `None` when this rule cannot tell.
    fn infer(&self, candidate: &RawCandidate) -> Option<String>;
}

/// Picks the first resolution token (`720p`, `1080p`, `2160p`) out of the
/// candidate's magnet link.
pub struct ResolutionTokenRule {
    pattern: Regex,
}

impl ResolutionTokenRule {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\d{3,4}p").expect("valid regex"),
        }
    }
}

impl Default for ResolutionTokenRule {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityRule for ResolutionTokenRule {
    fn name(&self) -> &str {
        "resolution_token"
    }

    fn infer(&self, candidate: &RawCandidate) -> Option<String> {
        self.pattern
            .find(&candidate.magnet_link)
            .map(|m| m.as_str().to_string())
    }
}

/// Tags candidates whose size falls inside a band, e.g. 110–380 MB ⇒ "SD".
///
/// Coarse: a short HD episode can land in the SD band.
pub struct SizeBandRule {
    band_mb: RangeInclusive<f64>,
    tag: String,
}

impl SizeBandRule {
    pub fn new(band_mb: RangeInclusive<f64>, tag: impl Into<String>) -> Self {
        Self {
            band_mb,
            tag: tag.into(),
        }
    }

    /// The standard-definition band for a ~45 minute episode.
    pub fn standard_definition() -> Self {
        Self::new(110.0..=380.0, SD)
    }
}

impl QualityRule for SizeBandRule {
    fn name(&self) -> &str {
        "size_band"
    }

    fn infer(&self, candidate: &RawCandidate) -> Option<String> {
        self.band_mb
            .contains(&candidate.size_mb)
            .then(|| self.tag.clone())
    }
}

/// Ordered chain of quality rules.
pub struct QualityInference {
    rules: Vec<Box<dyn QualityRule>>,
}

impl QualityInference {
    /// An empty chain: every candidate's quality is unknown.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, consulted after the ones already present.
    pub fn with_rule(mut self, rule: impl QualityRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn infer(&self, candidate: &RawCandidate) -> Option<String> {
        self.rules.iter().find_map(|rule| rule.infer(candidate))
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl Default for QualityInference {
    /// Resolution token first, then the SD size band.
    fn default() -> Self {
        Self::empty()
            .with_rule(ResolutionTokenRule::new())
            .with_rule(SizeBandRule::standard_definition())
    }
}
