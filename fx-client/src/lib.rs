//! # FX Rates Client
//!
//! An HTTP [`RateResolver`] backed by a rates API.
//!
//! The API is queried as `GET {base_url}/{YYYY-MM-DD}?from=USD&to=EUR` and
//! must answer with `{"rates": {"EUR": 0.85}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fx_types::{RateError, RateResolver};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate for {0} missing from response")]
    MissingRate(String),
}

impl From<ClientError> for RateError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Http(e) if e.is_timeout() => RateError::Timeout,
            ClientError::Http(e) => RateError::ServiceUnavailable(e.to_string()),
            ClientError::Api { status, message } => {
                RateError::ServiceUnavailable(format!("{status} - {message}"))
            }
            ClientError::MissingRate(code) => {
                RateError::ServiceUnavailable(format!("rate for {code} missing from response"))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Rates API client.
#[derive(Debug, Clone)]
pub struct HttpRateResolver {
    base_url: String,
    http: Client,
}

impl HttpRateResolver {
    /// Creates a resolver with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the `from -> to` rate for the day of `date`.
    ///
    /// Returns `Ok(None)` when the API answers 404 for the pair.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_rate(
        &self,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
    ) -> Result<Option<f64>, ClientError> {
        let url = format!("{}/{}", self.base_url, date.format("%Y-%m-%d"));
        let resp = self
            .http
            .get(url)
            .query(&[("from", from), ("to", to)])
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!("rate not published");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: RatesResponse = resp.json().await?;
        let rate = body
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| ClientError::MissingRate(to.to_string()))?;
        debug!(rate, "rate fetched");
        Ok(Some(rate))
    }
}

#[async_trait]
impl RateResolver for HttpRateResolver {
    async fn resolve_rate(
        &self,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
    ) -> Result<f64, RateError> {
        match self.fetch_rate(from, to, date).await {
            Ok(Some(rate)) => Ok(rate),
            Ok(None) | Err(ClientError::MissingRate(_)) => Err(RateError::RateNotAvailable(
                from.to_string(),
                to.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpRateResolver::new("http://localhost:3000").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = HttpRateResolver::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_api_error_maps_to_service_unavailable() {
        let error = ClientError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(
            RateError::from(error),
            RateError::ServiceUnavailable("502 - bad gateway".into())
        );
    }
}
