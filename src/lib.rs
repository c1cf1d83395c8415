//! Media-browsing client core: catalog fetch orchestration (caching,
//! cancellation, paginated accumulation), tracked user lists, and
//! personalized recommendations.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
