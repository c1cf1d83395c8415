//! Candidate generation strategies.
//!
//! Each strategy turns the user's signal into unranked candidates using the
//! catalog. Strategies never fail: a failed catalog call is logged and
//! contributes nothing, so one bad lookup cannot sink the whole pass.

use futures_util::future::join_all;
use std::sync::Arc;

use super::{GenreDirectory, GenreWeights};
use crate::models::{
    CatalogItem, MediaType, RecommendationCandidate, TimeWindow, TrackedItem, TrendingScope,
    UserSignal,
};
use crate::services::catalog::CatalogClient;

/// Number of heaviest genres the genre strategy explores
pub const TOP_GENRES: usize = 3;
/// Number of most recently added favorites the similarity strategy expands
pub const SIMILAR_SOURCES: usize = 3;

pub const GENRE_BASE_SCORE: f64 = 6.0;
pub const GENRE_WEIGHT_FACTOR: f64 = 0.5;
pub const MAX_SCORE: f64 = 10.0;
pub const SIMILAR_SCORE: f64 = 8.5;
pub const TRENDING_BASE_SCORE: f64 = 7.0;

pub const TRENDING_REASON: &str = "Trending now";

/// Inputs shared by every strategy during one pass
pub struct StrategyContext<'a> {
    pub signal: &'a UserSignal,
    pub weights: &'a GenreWeights,
    pub genres: &'a GenreDirectory,
    pub limit: usize,
}

/// A pluggable candidate source
#[async_trait::async_trait]
pub trait CandidateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, ctx: &StrategyContext<'_>) -> Vec<RecommendationCandidate>;
}

/// `6 + weight/2`, never above 10
pub fn genre_score(weight: f64) -> f64 {
    (GENRE_BASE_SCORE + weight * GENRE_WEIGHT_FACTOR).min(MAX_SCORE)
}

/// Quality-weighted trending boost: `7 + (vote_average / 10) * 2`
pub fn trending_score(vote_average: f64) -> f64 {
    TRENDING_BASE_SCORE + (vote_average.clamp(0.0, 10.0) / 10.0) * 2.0
}

fn candidate(
    item: CatalogItem,
    score: f64,
    reason: String,
    genres: Vec<String>,
) -> RecommendationCandidate {
    RecommendationCandidate {
        media_id: item.id,
        media_type: item.media_type,
        title: item.title,
        poster_path: item.poster_path,
        score,
        reason,
        genres,
    }
}

/// Discover-by-genre for the user's heaviest genres
pub struct GenreStrategy {
    catalog: Arc<dyn CatalogClient>,
}

impl GenreStrategy {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    async fn discover(
        &self,
        ctx: &StrategyContext<'_>,
        genre: &str,
        weight: f64,
        media_type: MediaType,
        per_call: usize,
    ) -> Vec<RecommendationCandidate> {
        let Some(genre_id) = ctx.genres.id_for(media_type, genre) else {
            tracing::debug!(genre = %genre, media_type = %media_type, "No catalog genre id");
            return Vec::new();
        };

        match self
            .catalog
            .discover_by_genre(media_type, genre_id, 1)
            .await
        {
            Ok(page) => page
                .results
                .into_iter()
                .take(per_call)
                .map(|item| {
                    let mut genres = ctx.genres.names_for(media_type, &item.genre_ids);
                    if genres.is_empty() {
                        genres.push(genre.to_string());
                    }
                    candidate(
                        item,
                        genre_score(weight),
                        format!("Because you like {}", genre),
                        genres,
                    )
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    strategy = self.name(),
                    genre = %genre,
                    media_type = %media_type,
                    error = %e,
                    "Genre lookup failed"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl CandidateStrategy for GenreStrategy {
    fn name(&self) -> &'static str {
        "genre"
    }

    async fn generate(&self, ctx: &StrategyContext<'_>) -> Vec<RecommendationCandidate> {
        let per_call = ctx.limit.div_ceil(6).max(1);
        let top = ctx.weights.top(TOP_GENRES);

        let lookups = top.iter().flat_map(|(genre, weight)| {
            MediaType::ALL
                .into_iter()
                .map(move |media_type| self.discover(ctx, genre, *weight, media_type, per_call))
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

/// "More like this" for the most recently added favorites
pub struct SimilarityStrategy {
    catalog: Arc<dyn CatalogClient>,
}

impl SimilarityStrategy {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    async fn similar_to(
        &self,
        ctx: &StrategyContext<'_>,
        source: &TrackedItem,
        per_source: usize,
    ) -> Vec<RecommendationCandidate> {
        match self
            .catalog
            .similar(source.media_type, source.media_id, 1)
            .await
        {
            Ok(page) => page
                .results
                .into_iter()
                .take(per_source)
                .map(|item| {
                    let genres = ctx.genres.names_for(item.media_type, &item.genre_ids);
                    candidate(
                        item,
                        SIMILAR_SCORE,
                        format!("Because you liked {}", source.title),
                        genres,
                    )
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    strategy = self.name(),
                    media_id = source.media_id,
                    media_type = %source.media_type,
                    error = %e,
                    "Similar-titles lookup failed"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl CandidateStrategy for SimilarityStrategy {
    fn name(&self) -> &'static str {
        "similar"
    }

    async fn generate(&self, ctx: &StrategyContext<'_>) -> Vec<RecommendationCandidate> {
        let per_source = ctx.limit.div_ceil(3).max(1);

        let mut sources: Vec<&TrackedItem> = ctx.signal.favorites.iter().collect();
        sources.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        sources.truncate(SIMILAR_SOURCES);

        let lookups = sources
            .into_iter()
            .map(|source| self.similar_to(ctx, source, per_source));

        join_all(lookups).await.into_iter().flatten().collect()
    }
}

/// Weekly trending movies and TV
pub struct TrendingStrategy {
    catalog: Arc<dyn CatalogClient>,
}

impl TrendingStrategy {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    async fn trending(
        &self,
        ctx: &StrategyContext<'_>,
        media_type: MediaType,
        per_call: usize,
    ) -> Vec<RecommendationCandidate> {
        match self
            .catalog
            .trending(TrendingScope::Only(media_type), TimeWindow::Week, 1)
            .await
        {
            Ok(page) => page
                .results
                .into_iter()
                .take(per_call)
                .map(|item| {
                    let score = trending_score(item.vote_average);
                    let genres = ctx.genres.names_for(item.media_type, &item.genre_ids);
                    candidate(item, score, TRENDING_REASON.to_string(), genres)
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    strategy = self.name(),
                    media_type = %media_type,
                    error = %e,
                    "Trending lookup failed"
                );
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl CandidateStrategy for TrendingStrategy {
    fn name(&self) -> &'static str {
        "trending"
    }

    async fn generate(&self, ctx: &StrategyContext<'_>) -> Vec<RecommendationCandidate> {
        let per_call = ctx.limit.div_ceil(2).max(1);
        let (movies, shows) = tokio::join!(
            self.trending(ctx, MediaType::Movie, per_call),
            self.trending(ctx, MediaType::Tv, per_call)
        );
        movies.into_iter().chain(shows).collect()
    }
}
