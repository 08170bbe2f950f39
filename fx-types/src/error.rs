//! Error types for the conversion pipeline.

use crate::ports::RateError;

/// Setup-time errors. Raised once while building a converter, never per record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("At least one field mapping is required")]
    NoMappings,

    #[error("A rate resolver is required")]
    MissingResolver,
}

/// Per-field conversion failures.
///
/// These never escape the converter; they reach the error sink and, when
/// rollback is enabled, abort the remaining fields of the invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid exchange rate {rate} for {from} -> {to}")]
    InvalidRate { from: String, to: String, rate: f64 },

    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Errors while moving a host document in and out of record form.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid update payload: {0}")]
    InvalidUpdate(String),
}
