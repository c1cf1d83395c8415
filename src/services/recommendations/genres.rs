use std::collections::HashMap;

use crate::models::{Genre, MediaType};
use crate::services::catalog::CatalogClient;

/// Movie genre names the catalog files under a differently named TV genre part
const TV_ALIASES: &[(&str, &str)] = &[("Science Fiction", "Sci-Fi")];

/// Genre id/name lookup for movies and TV, loaded once per recommendation pass.
///
/// Movie and TV genre ids differ in the catalog, and TV merges several movie
/// genres into one ("Action & Adventure", "Sci-Fi & Fantasy"), so lookups are
/// always scoped by media type.
#[derive(Debug, Clone, Default)]
pub struct GenreDirectory {
    by_type: HashMap<MediaType, Vec<Genre>>,
}

impl GenreDirectory {
    /// Loads both genre lists. A failed list is logged and left empty.
    pub async fn load(catalog: &dyn CatalogClient) -> Self {
        let (movie, tv) = tokio::join!(
            catalog.genres(MediaType::Movie),
            catalog.genres(MediaType::Tv)
        );

        let mut directory = Self::default();
        for (media_type, result) in [(MediaType::Movie, movie), (MediaType::Tv, tv)] {
            match result {
                Ok(genres) => directory.insert(media_type, genres),
                Err(e) => tracing::warn!(
                    media_type = %media_type,
                    catalog = catalog.name(),
                    error = %e,
                    "Failed to load genre list"
                ),
            }
        }
        directory
    }

    pub fn insert(&mut self, media_type: MediaType, genres: Vec<Genre>) {
        self.by_type.insert(media_type, genres);
    }

    /// Case-insensitive name lookup.
    ///
    /// Without an exact match, a name also resolves to a merged genre that
    /// lists it as one of its `&`-separated parts.
    pub fn id_for(&self, media_type: MediaType, name: &str) -> Option<u64> {
        let genres = self.by_type.get(&media_type)?;
        let name = name.trim();

        if let Some(genre) = genres.iter().find(|g| g.name.eq_ignore_ascii_case(name)) {
            return Some(genre.id);
        }

        let part = TV_ALIASES
            .iter()
            .find(|(from, _)| from.eq_ignore_ascii_case(name))
            .map_or(name, |(_, to)| *to);
        genres
            .iter()
            .find(|g| {
                g.name
                    .split('&')
                    .any(|piece| piece.trim().eq_ignore_ascii_case(part))
            })
            .map(|genre| genre.id)
    }

    /// Names for `ids`, skipping any the directory doesn't know
    pub fn names_for(&self, media_type: MediaType, ids: &[u64]) -> Vec<String> {
        let Some(genres) = self.by_type.get(&media_type) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| genres.iter().find(|genre| genre.id == *id))
            .map(|genre| genre.name.clone())
            .collect()
    }
}
