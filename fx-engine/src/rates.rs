//! Fixed rate table for development and testing.
//!
//! Rates are keyed by currency pair. A missing pair falls back to the
//! inverse of the opposite pair; identical currencies always convert at 1.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fx_types::{RateError, RateResolver};

#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    rates: HashMap<(String, String), f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.insert(from, to, rate);
        self
    }

    pub fn insert(&mut self, from: &str, to: &str, rate: f64) {
        self.rates
            .insert((from.to_uppercase(), to.to_uppercase()), rate);
    }

    /// Builds a table from `"FROM_TO"` (or `"FROM/TO"`) keyed pairs.
    pub fn from_pairs<K: AsRef<str>>(
        pairs: impl IntoIterator<Item = (K, f64)>,
    ) -> Result<Self, RateError> {
        let mut table = Self::new();
        for (key, rate) in pairs {
            let key = key.as_ref();
            let (from, to) = key
                .split_once(['_', '/'])
                .filter(|(from, to)| from.len() == 3 && to.len() == 3)
                .ok_or_else(|| RateError::InvalidPair(key.to_string()))?;
            table.insert(from, to, rate);
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return Some(1.0);
        }

        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Some(*rate);
        }

        self.rates
            .get(&(to, from))
            .filter(|rate| rate.is_finite() && **rate != 0.0)
            .map(|rate| 1.0 / rate)
    }
}

#[async_trait]
impl RateResolver for StaticRates {
    async fn resolve_rate(
        &self,
        from: &str,
        to: &str,
        _date: DateTime<Utc>,
    ) -> Result<f64, RateError> {
        self.rate(from, to)
            .ok_or_else(|| RateError::RateNotAvailable(from.to_string(), to.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_and_inverse_rates() {
        let rates = StaticRates::new().with_rate("USD", "EUR", 0.8);

        assert_eq!(rates.rate("USD", "EUR"), Some(0.8));
        assert_eq!(rates.rate("eur", "usd"), Some(1.25));
        assert_eq!(rates.rate("GBP", "GBP"), Some(1.0));
        assert_eq!(rates.rate("USD", "JPY"), None);
    }

    #[test]
    fn test_from_pairs() {
        let rates = StaticRates::from_pairs([("USD_EUR", 0.85), ("gbp/usd", 1.27)]).unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates.rate("USD", "EUR"), Some(0.85));
        assert_eq!(rates.rate("GBP", "USD"), Some(1.27));
    }

    #[test]
    fn test_from_pairs_rejects_malformed_keys() {
        let result = StaticRates::from_pairs([("USDEUR", 0.85)]);
        assert_eq!(result.unwrap_err(), RateError::InvalidPair("USDEUR".into()));
    }

    #[tokio::test]
    async fn test_resolver_reports_missing_pair() {
        let rates = StaticRates::new().with_rate("USD", "EUR", 0.85);

        assert_eq!(rates.resolve_rate("USD", "EUR", Utc::now()).await, Ok(0.85));
        assert_eq!(
            rates.resolve_rate("USD", "CHF", Utc::now()).await,
            Err(RateError::RateNotAvailable("USD".into(), "CHF".into()))
        );
    }
}
