//! Personalized recommendations.
//!
//! A pass runs in four steps:
//!
//! 1. Build [`GenreWeights`] from the user's signal.
//! 2. Run every [`CandidateStrategy`] concurrently and concatenate their
//!    output in registration order (genre, similar, trending by default).
//! 3. Drop candidates the user already tracks, then drop repeats keeping the
//!    first occurrence.
//! 4. Sort by score, highest first, and keep `limit`.
//!
//! An empty result is not retried here. Callers that want something on
//! screen anyway use [`recommend_with_fallback`].

use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    CandidateKey, RecommendationCandidate, RecommendationSet, RecommendationSource, UserSignal,
};
use crate::services::catalog::CatalogClient;

pub mod fallback;
pub mod genres;
pub mod strategies;
pub mod weights;

pub use fallback::{recommend_with_fallback, POPULAR_REASON};
pub use genres::GenreDirectory;
pub use strategies::{
    CandidateStrategy, GenreStrategy, SimilarityStrategy, StrategyContext, TrendingStrategy,
    TRENDING_REASON,
};
pub use weights::GenreWeights;

pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogClient>,
    strategies: Vec<Box<dyn CandidateStrategy>>,
}

impl RecommendationEngine {
    /// Engine with the built-in genre, similarity and trending strategies
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        let strategies: Vec<Box<dyn CandidateStrategy>> = vec![
            Box::new(GenreStrategy::new(catalog.clone())),
            Box::new(SimilarityStrategy::new(catalog.clone())),
            Box::new(TrendingStrategy::new(catalog.clone())),
        ];
        Self::with_strategies(catalog, strategies)
    }

    /// Engine with a custom strategy list. Earlier strategies win ties and duplicates.
    pub fn with_strategies(
        catalog: Arc<dyn CatalogClient>,
        strategies: Vec<Box<dyn CandidateStrategy>>,
    ) -> Self {
        Self {
            catalog,
            strategies,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs one recommendation pass. Never fails; a degraded pass yields fewer candidates.
    pub async fn recommend(&self, signal: &UserSignal, limit: usize) -> RecommendationSet {
        let weights = GenreWeights::from_signal(signal);
        let genre_weights = weights.top(weights.len());

        if limit == 0 {
            return RecommendationSet {
                candidates: Vec::new(),
                genre_weights,
                source: RecommendationSource::Personalized,
            };
        }

        let genres = GenreDirectory::load(self.catalog.as_ref()).await;
        let ctx = StrategyContext {
            signal,
            weights: &weights,
            genres: &genres,
            limit,
        };

        let outputs = join_all(self.strategies.iter().map(|s| s.generate(&ctx))).await;

        let mut generated = Vec::new();
        for (strategy, candidates) in self.strategies.iter().zip(outputs) {
            tracing::debug!(
                strategy = strategy.name(),
                candidates = candidates.len(),
                "Strategy finished"
            );
            generated.extend(candidates);
        }

        let generated_count = generated.len();
        let candidates = rank(generated, &signal.tracked_keys(), limit);

        let top_genres: Vec<&str> = genre_weights
            .iter()
            .take(3)
            .map(|(genre, _)| genre.as_str())
            .collect();
        tracing::info!(
            generated = generated_count,
            returned = candidates.len(),
            top_genres = ?top_genres,
            "Recommendation pass completed"
        );

        RecommendationSet {
            candidates,
            genre_weights,
            source: RecommendationSource::Personalized,
        }
    }
}

/// Filters out tracked items, drops repeats (first occurrence wins), sorts by
/// score descending and truncates to `limit`.
///
/// The sort is stable, so equal scores keep generation order.
pub fn rank(
    candidates: Vec<RecommendationCandidate>,
    tracked: &HashSet<CandidateKey>,
    limit: usize,
) -> Vec<RecommendationCandidate> {
    let mut seen: HashSet<CandidateKey> = HashSet::with_capacity(candidates.len());
    let mut ranked: Vec<RecommendationCandidate> = candidates
        .into_iter()
        .filter(|c| !tracked.contains(&c.key()))
        .filter(|c| seen.insert(c.key()))
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}
