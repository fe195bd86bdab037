use crate::domain::error::FetchError;

/// Get-or-compute key/value store with expiry.
pub trait CacheStore {
    /// Returns the fresh value under `key`, or runs `compute` and stores its
    /// output for `ttl`. A failed compute stores nothing. A non-positive `ttl`
    /// computes without storing.
    fn remember(
        &self,
        key: &str,
        ttl: chrono::Duration,
        compute: &mut dyn FnMut() -> Result<String, FetchError>,
    ) -> Result<String, FetchError>;
}
