//! Exchange rate resolver port.
//!
//! This trait defines the interface for exchange rate sources.
//! Implementations can be HTTP clients, static tables, mocks, etc.

use std::future::Future;

use chrono::{DateTime, Utc};

/// Error type for exchange rate lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate not available for {0} -> {1}")]
    RateNotAvailable(String, String),

    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),

    #[error("Rate lookup timed out")]
    Timeout,
}

/// Port trait for exchange rate sources.
///
/// The converter calls this at most once per field and never retries. A
/// caller wanting a deadline should enforce it here and return an error.
#[async_trait::async_trait]
pub trait RateResolver: Send + Sync {
    /// Returns how many units of `to` one unit of `from` buys on `date`.
    async fn resolve_rate(
        &self,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
    ) -> Result<f64, RateError>;
}

/// Adapts an async closure into a [`RateResolver`].
pub struct FnResolver<F>(F);

/// Wraps `f(from, to, date)` as a resolver.
///
/// ```
/// use fx_types::{RateError, rate_fn};
///
/// let resolver = rate_fn(|_from, _to, _date| async { Ok::<_, RateError>(0.85) });
/// # let _ = resolver;
/// ```
pub fn rate_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(String, String, DateTime<Utc>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<f64, RateError>> + Send + 'static,
{
    FnResolver(f)
}

#[async_trait::async_trait]
impl<F, Fut> RateResolver for FnResolver<F>
where
    F: Fn(String, String, DateTime<Utc>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<f64, RateError>> + Send + 'static,
{
    async fn resolve_rate(
        &self,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
    ) -> Result<f64, RateError> {
        (self.0)(from.to_owned(), to.to_owned(), date).await
    }
}
