use std::collections::HashMap;

use crate::models::{TrackedItem, UserSignal};

/// Per-occurrence weight of an explicitly preferred genre
pub const EXPLICIT_WEIGHT: f64 = 3.0;
/// Per-genre weight contributed by each favorite
pub const FAVORITE_WEIGHT: f64 = 2.0;
/// Per-genre weight contributed by each watchlist entry
pub const WATCHLIST_WEIGHT: f64 = 1.5;
/// Per-genre weight contributed by each recent watch
pub const RECENT_WATCH_WEIGHT: f64 = 1.0;

/// Genre affinity map, rebuilt from scratch for every recommendation pass.
///
/// Contributions are additive and never negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreWeights {
    weights: HashMap<String, f64>,
}

impl GenreWeights {
    pub fn from_signal(signal: &UserSignal) -> Self {
        let mut weights = Self::default();

        for genre in &signal.explicit_genres {
            weights.add(genre, EXPLICIT_WEIGHT);
        }
        weights.add_items(&signal.favorites, FAVORITE_WEIGHT);
        weights.add_items(&signal.watchlist, WATCHLIST_WEIGHT);
        weights.add_items(&signal.recent_watches, RECENT_WATCH_WEIGHT);

        weights
    }

    fn add_items(&mut self, items: &[TrackedItem], weight: f64) {
        for item in items {
            for genre in &item.genres {
                self.add(genre, weight);
            }
        }
    }

    fn add(&mut self, genre: &str, weight: f64) {
        let genre = genre.trim();
        if genre.is_empty() {
            return;
        }
        *self.weights.entry(genre.to_string()).or_insert(0.0) += weight;
    }

    pub fn get(&self, genre: &str) -> Option<f64> {
        self.weights.get(genre).copied()
    }

    /// The `n` heaviest genres, ties broken alphabetically
    pub fn top(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .weights
            .iter()
            .map(|(genre, weight)| (genre.clone(), *weight))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
