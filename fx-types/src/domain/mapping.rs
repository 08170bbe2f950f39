//! Field mapping configuration.

use serde::{Deserialize, Serialize};

/// Where to read an amount, its currency and (optionally) its date, and
/// where to write the converted value.
///
/// Mappings are static configuration: build them once and hand them to the
/// converter, which validates the set at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Dotted path to the numeric amount
    #[serde(alias = "sourcePath")]
    pub source_path: String,
    /// Dotted path to the three-letter source currency code
    #[serde(alias = "currencyPath")]
    pub currency_path: String,
    /// Dotted path to the conversion date; "now" when absent
    #[serde(default, alias = "datePath", skip_serializing_if = "Option::is_none")]
    pub date_path: Option<String>,
    /// Dotted path that receives the conversion result
    #[serde(alias = "targetPath")]
    pub target_path: String,
    /// Destination currency code
    #[serde(alias = "toCurrency")]
    pub to_currency: String,
}

impl FieldMapping {
    pub fn new(
        source_path: impl Into<String>,
        currency_path: impl Into<String>,
        target_path: impl Into<String>,
        to_currency: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            currency_path: currency_path.into(),
            date_path: None,
            target_path: target_path.into(),
            to_currency: to_currency.into(),
        }
    }

    pub fn with_date_path(mut self, date_path: impl Into<String>) -> Self {
        self.date_path = Some(date_path.into());
        self
    }
}
