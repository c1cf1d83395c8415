use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod recommendation;
pub mod tracked;

pub use recommendation::{
    CandidateKey, RecommendationCandidate, RecommendationSet, RecommendationSource, UserSignal,
};
pub use tracked::{GatewayResponse, ResponseCode, TrackedItem, TrackedListKind, TrackedPage};

/// Kind of media in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Tv];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaType::Movie),
            "tv" => Some(MediaType::Tv),
            _ => None,
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Curated catalog listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    Popular,
    TopRated,
    /// Movies only
    Upcoming,
    /// Movies only
    NowPlaying,
    /// TV only
    OnTheAir,
    /// TV only
    AiringToday,
}

impl ListCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListCategory::Popular => "popular",
            ListCategory::TopRated => "top_rated",
            ListCategory::Upcoming => "upcoming",
            ListCategory::NowPlaying => "now_playing",
            ListCategory::OnTheAir => "on_the_air",
            ListCategory::AiringToday => "airing_today",
        }
    }

    pub fn supports(&self, media_type: MediaType) -> bool {
        match self {
            ListCategory::Popular | ListCategory::TopRated => true,
            ListCategory::Upcoming | ListCategory::NowPlaying => media_type == MediaType::Movie,
            ListCategory::OnTheAir | ListCategory::AiringToday => media_type == MediaType::Tv,
        }
    }
}

/// Media filter for trending queries. `All` mixes movies and TV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingScope {
    All,
    Only(MediaType),
}

impl TrendingScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingScope::All => "all",
            TrendingScope::Only(media_type) => media_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Movie,
    Tv,
    Multi,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::Movie => "movie",
            SearchScope::Tv => "tv",
            SearchScope::Multi => "multi",
        }
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paged<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> Paged<T> {
    pub fn single(results: Vec<T>) -> Self {
        let total_results = results.len() as u32;
        Self {
            page: 1,
            results,
            total_pages: 1,
            total_results,
        }
    }
}

/// A movie or TV title as returned by list, search, discover, and trending calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    pub vote_average: f64,
    pub genre_ids: Vec<u64>,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Full details for a single title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDetails {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub genres: Vec<Genre>,
    pub release_date: Option<String>,
    /// Minutes; episode runtime for TV
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.video_type == "Trailer"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}
