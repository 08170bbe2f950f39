//! Configuration loading from environment and mapping files.

use std::env;
use std::path::Path;

use anyhow::Context;
use fx_types::{ConversionOptions, FieldMapping};
use serde::Deserialize;

const DEFAULT_CACHE_TTL_MINUTES: u64 = 60;
const DEFAULT_RATES_TIMEOUT_SECS: u64 = 10;

/// Process-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_ttl_minutes: u64,
    pub rates_timeout_secs: u64,
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let cache_ttl_minutes = match lookup("FX_CACHE_TTL_MINUTES") {
            Some(value) => value
                .parse()
                .with_context(|| format!("FX_CACHE_TTL_MINUTES is not a number: {value}"))?,
            None => DEFAULT_CACHE_TTL_MINUTES,
        };

        let rates_timeout_secs = match lookup("FX_RATES_TIMEOUT_SECS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("FX_RATES_TIMEOUT_SECS is not a number: {value}"))?,
            None => DEFAULT_RATES_TIMEOUT_SECS,
        };

        let log_json = lookup("FX_LOG_JSON")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            cache_ttl_minutes,
            rates_timeout_secs,
            log_json,
        })
    }
}

/// Mapping file: `{ "mappings": [...], "options": {...} }`.
#[derive(Debug, Deserialize)]
pub struct ConversionFile {
    pub mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub options: ConversionOptions,
}

impl ConversionFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading mapping file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing mapping file {}", path.display()))
    }
}
