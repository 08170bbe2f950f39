//! In-process expiring cache.
//!
//! Entries carry a fixed TTL set at construction. Expiry is checked lazily
//! on read; nothing sweeps in the background unless `purge_expired` is
//! called.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use fx_types::{CacheError, RateCache};

pub const DEFAULT_TTL_MINUTES: u64 = 60;

struct CacheEntry<T> {
    value: T,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// TTL key-value store shared safely across tasks.
pub struct MemoryCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::with_ttl_minutes(DEFAULT_TTL_MINUTES)
    }
}

impl<T: Clone> MemoryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl_minutes(minutes: u64) -> Self {
        Self::with_ttl(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the value if present and not yet expired. Reads never extend the TTL.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        None
    }

    /// Stores `value`, replacing any previous entry and its expiry.
    pub fn set(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(self.ttl),
        };
        self.entries.insert(key.into(), entry);
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl RateCache for MemoryCache<f64> {
    async fn get(&self, key: &str) -> Result<Option<f64>, CacheError> {
        Ok(MemoryCache::get(self, key))
    }

    async fn set(&self, key: &str, rate: f64) -> Result<(), CacheError> {
        MemoryCache::set(self, key, rate);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        MemoryCache::delete(self, key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        MemoryCache::clear(self);
        Ok(())
    }
}
