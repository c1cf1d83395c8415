/// Read-through lookup against a [`FetchCache`](crate::cache::FetchCache).
///
/// Evaluates to `AppResult<T>`. A live entry under `$key` is returned as is;
/// otherwise `$block` (a future yielding `AppResult<T>`) is awaited and a
/// successful value is stored for `$ttl`. Errors are returned uncached.
///
/// Concurrent misses for one key each run `$block`; the last write wins.
///
/// ```rust,ignore
/// let genres: Vec<Genre> = cached!(self.cache, key, REFERENCE_TTL, async {
///     self.fetch_genres(media_type).await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get(&key) {
            Ok(Some(cached)) => Ok(cached),
            Ok(None) => match $block.await {
                Ok(value) => {
                    $cache.set(&key, &value, $ttl);
                    Ok(value)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }};
}
