//! Rate cache port.
//!
//! Any store that can hold rates by key can back the converter: an
//! in-process map, Redis, a database table. Only `get` and `set` are
//! required.

/// Error type for cache backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Port trait for rate caches.
///
/// Keys are built by the converter as `FROM_TO_YYYY-MM-DD`. A cache shared
/// between converters may be called concurrently and must handle that itself.
#[async_trait::async_trait]
pub trait RateCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<f64>, CacheError>;

    async fn set(&self, key: &str, rate: f64) -> Result<(), CacheError>;

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
