//! Serializable converter options.
//!
//! These are the plain-data knobs of a converter, loadable from a config
//! file. Runtime collaborators (resolver, cache, hooks) are injected through
//! the converter builder instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Restricts accepted currency codes. `Some(vec![])` rejects every code.
    #[serde(alias = "allowedCurrencies", skip_serializing_if = "Option::is_none")]
    pub allowed_currencies: Option<Vec<String>>,

    /// Used when the resolver returns an unusable rate (zero, NaN, infinite).
    #[serde(alias = "fallbackRate", skip_serializing_if = "Option::is_none")]
    pub fallback_rate: Option<f64>,

    /// Erase every target written in the invocation and stop on the first failure.
    #[serde(alias = "rollbackOnError")]
    pub rollback_on_error: bool,

    /// Enables the built-in in-memory rate cache with this TTL.
    #[serde(alias = "cacheTtlMinutes", skip_serializing_if = "Option::is_none")]
    pub cache_ttl_minutes: Option<u64>,
}
