use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{MediaType, TrackedItem};

/// Composite identity used for deduplication: `(media_type, media_id)`
pub type CandidateKey = (MediaType, u64);

/// Aggregated view of everything the user has told us, directly or through their lists
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSignal {
    #[serde(default)]
    pub favorites: Vec<TrackedItem>,
    #[serde(default)]
    pub watchlist: Vec<TrackedItem>,
    #[serde(default)]
    pub recent_watches: Vec<TrackedItem>,
    #[serde(default)]
    pub explicit_genres: Vec<String>,
}

impl UserSignal {
    /// Every `(media_type, media_id)` already present in any tracked list
    pub fn tracked_keys(&self) -> HashSet<CandidateKey> {
        self.favorites
            .iter()
            .chain(&self.watchlist)
            .chain(&self.recent_watches)
            .map(TrackedItem::key)
            .collect()
    }
}

/// A suggestion produced by one generation strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCandidate {
    pub media_id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub score: f64,
    pub reason: String,
    pub genres: Vec<String>,
}

impl RecommendationCandidate {
    pub fn key(&self) -> CandidateKey {
        (self.media_type, self.media_id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Personalized,
    Fallback,
}

/// Ranked output of one recommendation pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub candidates: Vec<RecommendationCandidate>,
    /// `(genre, weight)` sorted by weight, heaviest first
    pub genre_weights: Vec<(String, f64)>,
    pub source: RecommendationSource,
}

impl RecommendationSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
