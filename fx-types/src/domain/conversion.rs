//! Conversion results and per-field outcomes.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConversionError;

/// The value written at a mapping's target path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: f64,
    /// Target currency code, upper-cased the same way as the rate lookup
    /// (`"eur"` in a mapping is written as `"EUR"`)
    pub currency: String,
    pub date: DateTime<Utc>,
}

impl ConversionResult {
    /// Record form: `{ "amount": .., "currency": .., "date": "<RFC 3339, ms, Z>" }`.
    ///
    /// A non-finite amount is written as `null`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("amount".into(), Value::from(self.amount));
        map.insert("currency".into(), Value::String(self.currency.clone()));
        map.insert(
            "date".into(),
            Value::String(self.date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        Value::Object(map)
    }
}

/// Details handed to the error sink when a field fails.
///
/// Borrowed for the duration of the callback only.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext<'a> {
    /// Source path of the failing mapping
    pub field: &'a str,
    pub from_currency: &'a str,
    pub to_currency: &'a str,
    pub date: DateTime<Utc>,
    pub error: &'a ConversionError,
}

/// Why a field was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Target path is not declared writable by the host schema
    UnwritableTarget(String),
    /// Target path cannot be created in this record, e.g. a named key under an array
    UnreachableTarget(String),
    /// No amount at the source path (normal for partial updates)
    MissingAmount,
    /// Amount present but not a number
    InvalidAmount(String),
    /// Currency path empty, missing or not a string
    MissingCurrency(String),
    InvalidSourceCurrency(String),
    InvalidTargetCurrency(String),
}

impl SkipReason {
    /// Silent skips produce no warning.
    pub fn is_silent(&self) -> bool {
        matches!(self, SkipReason::MissingAmount)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnwritableTarget(path) => {
                write!(f, "target path {path} is not a writable schema path")
            }
            SkipReason::UnreachableTarget(path) => {
                write!(f, "target path {path} cannot be written in this record")
            }
            SkipReason::MissingAmount => write!(f, "no source amount"),
            SkipReason::InvalidAmount(path) => write!(f, "amount at {path} is not a number"),
            SkipReason::MissingCurrency(path) => {
                write!(f, "missing or invalid currency code at {path}")
            }
            SkipReason::InvalidSourceCurrency(code) => {
                write!(f, "invalid source currency {code}")
            }
            SkipReason::InvalidTargetCurrency(code) => {
                write!(f, "invalid target currency {code}")
            }
        }
    }
}

/// Final state of one mapping after an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Converted(ConversionResult),
    Skipped(SkipReason),
    Failed(ConversionError),
    /// Converted, then erased because a later field failed
    RolledBack,
    /// Never reached because an earlier failure aborted the invocation
    NotAttempted,
}

impl fmt::Display for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOutcome::Converted(result) => {
                write!(f, "converted to {} {}", result.amount, result.currency)
            }
            FieldOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
            FieldOutcome::Failed(error) => write!(f, "failed: {error}"),
            FieldOutcome::RolledBack => write!(f, "rolled back"),
            FieldOutcome::NotAttempted => write!(f, "not attempted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub target_path: String,
    pub outcome: FieldOutcome,
}

/// One entry per mapping, in mapping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub fields: Vec<FieldReport>,
}

impl ConversionReport {
    pub fn outcome(&self, target_path: &str) -> Option<&FieldOutcome> {
        self.fields
            .iter()
            .find(|field| field.target_path == target_path)
            .map(|field| &field.outcome)
    }

    pub fn converted(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.outcome, FieldOutcome::Converted(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.outcome, FieldOutcome::Failed(_)))
            .count()
    }

    pub fn rolled_back(&self) -> bool {
        self.fields
            .iter()
            .any(|field| field.outcome == FieldOutcome::RolledBack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_result_to_value() {
        let result = ConversionResult {
            amount: 85.0,
            currency: "EUR".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        };

        assert_eq!(
            result.to_value(),
            json!({ "amount": 85.0, "currency": "EUR", "date": "2024-03-01T12:00:00.000Z" })
        );
    }

    #[test]
    fn test_result_value_round_trips_through_serde() {
        let result = ConversionResult {
            amount: 12.5,
            currency: "GBP".to_string(),
            date: Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap(),
        };

        let parsed: ConversionResult = serde_json::from_value(result.to_value()).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_only_missing_amount_is_silent() {
        assert!(SkipReason::MissingAmount.is_silent());
        assert!(!SkipReason::MissingCurrency("price.currency".into()).is_silent());
        assert!(!SkipReason::UnwritableTarget("conv".into()).is_silent());
        assert!(!SkipReason::UnreachableTarget("items.total".into()).is_silent());
    }

    #[test]
    fn test_report_summary() {
        let report = ConversionReport {
            fields: vec![
                FieldReport {
                    target_path: "a".into(),
                    outcome: FieldOutcome::RolledBack,
                },
                FieldReport {
                    target_path: "b".into(),
                    outcome: FieldOutcome::Skipped(SkipReason::MissingAmount),
                },
            ],
        };

        assert!(report.rolled_back());
        assert_eq!(report.converted(), 0);
        assert_eq!(
            report.outcome("b"),
            Some(&FieldOutcome::Skipped(SkipReason::MissingAmount))
        );
        assert_eq!(report.outcome("c"), None);
    }
}
