use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::MediaType;

/// The three user-owned lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TrackedListKind {
    Favorites,
    Watchlist,
    RecentWatches,
}

impl TrackedListKind {
    pub const ALL: [TrackedListKind; 3] = [
        TrackedListKind::Favorites,
        TrackedListKind::Watchlist,
        TrackedListKind::RecentWatches,
    ];

    /// Path segment used by the profile store and the HTTP surface
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedListKind::Favorites => "favorites",
            TrackedListKind::Watchlist => "watchlist",
            TrackedListKind::RecentWatches => "recent-watches",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Human-readable name used in gateway messages
    pub fn label(&self) -> &'static str {
        match self {
            TrackedListKind::Favorites => "favorites",
            TrackedListKind::Watchlist => "watchlist",
            TrackedListKind::RecentWatches => "recent watches",
        }
    }
}

impl Display for TrackedListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A media reference held in one of the user's lists.
///
/// `(media_id, media_type)` is unique within a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub media_id: u64,
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Genre names used as recommendation signal
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub watched_at: Option<DateTime<Utc>>,
    /// Percentage, 0..=100
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
}

impl TrackedItem {
    pub fn new(media_id: u64, media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            media_id,
            media_type,
            title: title.into(),
            poster_path: None,
            genres: Vec::new(),
            added_at: Utc::now(),
            watched_at: None,
            progress: None,
            season: None,
            episode: None,
        }
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn added_at(mut self, added_at: DateTime<Utc>) -> Self {
        self.added_at = added_at;
        self
    }

    pub fn key(&self) -> (MediaType, u64) {
        (self.media_type, self.media_id)
    }

    pub fn matches(&self, media_id: u64, media_type: MediaType) -> bool {
        self.media_id == media_id && self.media_type == media_type
    }

    /// Checks the item before it is written; the error is the rejection message
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if let Some(progress) = self.progress {
            if progress > 100 {
                return Err(format!(
                    "Progress must be between 0 and 100, got {}",
                    progress
                ));
            }
        }
        Ok(())
    }
}

/// Machine-readable reason attached to an unsuccessful gateway response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCode {
    AlreadyPresent,
    NotFound,
    Unsupported,
    Invalid,
}

/// Envelope returned by every tracked-list operation: `{success, message, data?}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ResponseCode>,
}

impl<T> GatewayResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            code: None,
        }
    }

    pub fn rejected(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            code: Some(code),
        }
    }

    pub fn is_already_present(&self) -> bool {
        self.code == Some(ResponseCode::AlreadyPresent)
    }
}

/// One page of a tracked list, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPage {
    pub items: Vec<TrackedItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u32,
}
