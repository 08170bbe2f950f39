//! Before-persist conversion hook.
//!
//! Turns a host document (or an update payload) into a plain record, runs
//! the converter over it and merges the result back.

use std::sync::Arc;

use fx_types::path;
use fx_types::{ConversionReport, FieldOutcome, LifecycleError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::service::CurrencyConverter;

const SET_OPERATOR: &str = "$set";

pub struct ConversionHook {
    converter: Arc<CurrencyConverter>,
}

impl ConversionHook {
    pub fn new(converter: CurrencyConverter) -> Self {
        Self::shared(Arc::new(converter))
    }

    pub fn shared(converter: Arc<CurrencyConverter>) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Save path: converts a whole document.
    ///
    /// The document is serialized to a record, converted, and deserialized
    /// back in place. Target fields must therefore exist on `T` (for
    /// example as `Option<ConversionResult>` or `serde_json::Value`).
    pub async fn apply_to<T>(&self, document: &mut T) -> Result<ConversionReport, LifecycleError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut record = serde_json::to_value(&*document)?;
        let report = self.converter.apply_conversions(&mut record).await;
        *document = serde_json::from_value(record)?;
        Ok(report)
    }

    /// Save path for documents already held as JSON.
    pub async fn apply_to_record(&self, record: &mut Value) -> ConversionReport {
        self.converter.apply_conversions(record).await
    }

    /// Update path: converts only the fields present in an update payload.
    ///
    /// Reads `$set` when the payload uses operators, the top-level fields
    /// otherwise. Dotted keys are expanded into a nested record before
    /// conversion. Converted targets are written back as dotted keys and
    /// rolled-back targets are removed from the payload.
    pub async fn apply_to_update(
        &self,
        update: &mut Value,
    ) -> Result<ConversionReport, LifecycleError> {
        let fields = update_fields(update)?;
        let mut record = Value::Object(Map::new());
        for (key, value) in fields {
            path::set(&mut record, key.as_str(), value);
        }

        let report = self.converter.apply_conversions(&mut record).await;

        let mut writes = Vec::new();
        let mut erased = Vec::new();
        for field in &report.fields {
            match field.outcome {
                FieldOutcome::Converted(_) => {
                    if let Some(value) = path::get(&record, field.target_path.as_str()) {
                        writes.push((field.target_path.clone(), value.clone()));
                    }
                }
                FieldOutcome::RolledBack => erased.push(field.target_path.clone()),
                _ => {}
            }
        }

        if writes.is_empty() && erased.is_empty() {
            return Ok(report);
        }

        let target = update_fields_mut(update)?;
        for key in &erased {
            target.remove(key.as_str());
        }
        debug!(written = writes.len(), erased = erased.len(), "update payload merged");
        for (key, value) in writes {
            target.insert(key, value);
        }

        Ok(report)
    }
}

fn has_operators(root: &Map<String, Value>) -> bool {
    root.keys().any(|key| key.starts_with('$'))
}

fn update_fields(update: &Value) -> Result<Map<String, Value>, LifecycleError> {
    let Value::Object(root) = update else {
        return Err(LifecycleError::InvalidUpdate(
            "update payload must be an object".into(),
        ));
    };

    if !has_operators(root) {
        return Ok(root.clone());
    }

    match root.get(SET_OPERATOR) {
        None => Ok(Map::new()),
        Some(Value::Object(set)) => Ok(set.clone()),
        Some(_) => Err(LifecycleError::InvalidUpdate("$set must be an object".into())),
    }
}

fn update_fields_mut(update: &mut Value) -> Result<&mut Map<String, Value>, LifecycleError> {
    let Value::Object(root) = update else {
        return Err(LifecycleError::InvalidUpdate(
            "update payload must be an object".into(),
        ));
    };

    if !has_operators(root) {
        return Ok(root);
    }

    match root
        .entry(SET_OPERATOR)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(set) => Ok(set),
        _ => Err(LifecycleError::InvalidUpdate("$set must be an object".into())),
    }
}
