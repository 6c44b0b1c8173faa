//! Season/episode codes and the cursor arithmetic used to compute the next
//! wanted episode of a series.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while handling episode codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpisodeError {
    #[error("invalid episode code: {0:?}")]
    Format(String),
}

/// A `(season, episode)` pair, rendered as `S01E02`.
///
/// Episode `0` means nothing of the season has been downloaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeCode {
    season: u32,
    episode: u32,
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[sS](\d{1,6})[eE](\d{1,6})$").expect("valid regex"))
}

impl EpisodeCode {
    /// The starting point of a freshly tracked series.
    pub const START: EpisodeCode = EpisodeCode {
        season: 1,
        episode: 0,
    };

    /// Build a code, rejecting season 0.
    pub fn new(season: u32, episode: u32) -> Result<Self, EpisodeError> {
        if season == 0 {
            return Err(EpisodeError::Format(format!("S{:02}E{:02}", season, episode)));
        }
        Ok(Self { season, episode })
    }

    /// Parse `S01E02` (case-insensitive).
    pub fn parse(text: &str) -> Result<Self, EpisodeError> {
        let caps = code_pattern()
            .captures(text.trim())
            .ok_or_else(|| EpisodeError::Format(text.to_string()))?;

        let season = caps[1]
            .parse::<u32>()
            .map_err(|_| EpisodeError::Format(text.to_string()))?;
        let episode = caps[2]
            .parse::<u32>()
            .map_err(|_| EpisodeError::Format(text.to_string()))?;

        Self::new(season, episode).map_err(|_| EpisodeError::Format(text.to_string()))
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Next episode of the same season. Never rolls over; saturates at
    /// `u32::MAX`.
    pub fn advance_episode(&self) -> Self {
        Self {
            season: self.season,
            episode: self.episode.saturating_add(1),
        }
    }

    /// Episode 1 of the following season, searched when the season may have ended.
    pub fn first_of_next_season(&self) -> Self {
        Self {
            season: self.season.saturating_add(1),
            episode: 1,
        }
    }

    /// Canonical uppercase text, e.g. `S01E09`.
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }
}

impl Default for EpisodeCode {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for EpisodeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

impl FromStr for EpisodeCode {
    type Err = EpisodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EpisodeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EpisodeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        EpisodeCode::parse(&text).map_err(serde::de::Error::custom)
    }
}
