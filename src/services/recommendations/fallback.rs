use super::{GenreDirectory, RecommendationEngine};
use super::strategies::TRENDING_REASON;
use crate::models::{
    ListCategory, MediaType, RecommendationCandidate, RecommendationSet, RecommendationSource,
    TimeWindow, TrendingScope, UserSignal,
};

pub const POPULAR_REASON: &str = "Popular right now";

/// Generic sources, in preference order
#[derive(Debug, Clone, Copy)]
enum FallbackSource {
    Popular,
    Trending,
}

impl FallbackSource {
    fn reason(&self) -> &'static str {
        match self {
            FallbackSource::Popular => POPULAR_REASON,
            FallbackSource::Trending => TRENDING_REASON,
        }
    }
}

/// Runs a personalized pass and, if it comes back empty, substitutes generic
/// content: popular movies first, then weekly trending movies.
///
/// Fallback candidates still exclude anything the user already tracks and are
/// scored by their catalog rating.
pub async fn recommend_with_fallback(
    engine: &RecommendationEngine,
    signal: &UserSignal,
    limit: usize,
) -> RecommendationSet {
    let personalized = engine.recommend(signal, limit).await;
    if !personalized.is_empty() || limit == 0 {
        return personalized;
    }

    tracing::info!("No personalized candidates, falling back to generic content");

    let catalog = engine.catalog().as_ref();
    let genres = GenreDirectory::load(catalog).await;
    let tracked = signal.tracked_keys();

    for source in [FallbackSource::Popular, FallbackSource::Trending] {
        let result = match source {
            FallbackSource::Popular => {
                catalog
                    .list(MediaType::Movie, ListCategory::Popular, 1)
                    .await
            }
            FallbackSource::Trending => {
                catalog
                    .trending(TrendingScope::Only(MediaType::Movie), TimeWindow::Week, 1)
                    .await
            }
        };
        let reason = source.reason();

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(reason = %reason, error = %e, "Fallback source failed");
                continue;
            }
        };

        let candidates: Vec<RecommendationCandidate> = page
            .results
            .into_iter()
            .filter(|item| !tracked.contains(&(item.media_type, item.id)))
            .take(limit)
            .map(|item| RecommendationCandidate {
                genres: genres.names_for(item.media_type, &item.genre_ids),
                media_id: item.id,
                media_type: item.media_type,
                title: item.title,
                poster_path: item.poster_path,
                score: item.vote_average,
                reason: reason.to_string(),
            })
            .collect();

        if !candidates.is_empty() {
            return RecommendationSet {
                candidates,
                genre_weights: personalized.genre_weights,
                source: RecommendationSource::Fallback,
            };
        }
    }

    personalized
}
