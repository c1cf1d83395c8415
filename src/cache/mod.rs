pub mod fetch_cache;
pub mod key;

mod macros;

pub use fetch_cache::{FetchCache, CATALOG_TTL, REFERENCE_TTL};
pub use key::CacheKey;
