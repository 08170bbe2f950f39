//! Currency Conversion Service
//!
//! Walks the configured field mappings over a record, resolves rates
//! (cache first, then the resolver, then the fallback rate) and writes the
//! converted values back into the record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use currency_codes::is_valid_currency;
use fx_types::path::{self, FieldPath};
use fx_types::{
    AnyPathWritable, ConfigError, ConversionError, ConversionLog, ConversionOptions,
    ConversionReport, ConversionResult, DateTransform, ErrorContext, ErrorSink, FieldMapping,
    FieldOutcome, FieldReport, RateCache, RateResolver, Rounding, SkipReason, TracingLog,
    TwoDecimals, WritablePaths,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cache::MemoryCache;
use crate::coerce;

/// Cache key for a rate: `FROM_TO_YYYY-MM-DD`.
///
/// The date is truncated to the day so that every conversion of a pair on
/// the same day shares one lookup.
pub fn cache_key(from: &str, to: &str, date: DateTime<Utc>) -> String {
    format!("{}_{}_{}", from, to, date.format("%Y-%m-%d"))
}

/// Zero, NaN and both infinities are unusable. Negative rates pass through.
fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate != 0.0
}

/// A mapping with its paths parsed once at construction.
struct CompiledMapping {
    source: FieldPath,
    currency: FieldPath,
    date: Option<FieldPath>,
    target: FieldPath,
    to_currency: String,
}

impl From<FieldMapping> for CompiledMapping {
    fn from(mapping: FieldMapping) -> Self {
        Self {
            source: FieldPath::new(mapping.source_path),
            currency: FieldPath::new(mapping.currency_path),
            date: mapping.date_path.map(FieldPath::new),
            target: FieldPath::new(mapping.target_path),
            to_currency: mapping.to_currency,
        }
    }
}

enum FieldStep {
    Converted(ConversionResult),
    Skipped(SkipReason),
    Failed {
        from: String,
        to: String,
        date: DateTime<Utc>,
        error: ConversionError,
    },
}

/// Applies field-level currency conversions to records.
///
/// Built once through [`CurrencyConverter::builder`]; the mapping set and
/// collaborators are fixed for the converter's lifetime. A converter is
/// `Send + Sync` and can serve concurrent invocations on different records.
pub struct CurrencyConverter {
    mappings: Vec<CompiledMapping>,
    resolver: Arc<dyn RateResolver>,
    cache: Option<Arc<dyn RateCache>>,
    writable: Arc<dyn WritablePaths>,
    rounding: Arc<dyn Rounding>,
    date_transform: Option<Arc<dyn DateTransform>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    log: Arc<dyn ConversionLog>,
    allowed_currencies: Option<Vec<String>>,
    fallback_rate: Option<f64>,
    rollback_on_error: bool,
}

impl CurrencyConverter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    pub fn target_paths(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(|mapping| mapping.target.as_str())
    }

    /// Converts every mapped field of `record` in place.
    ///
    /// Fields are processed strictly in mapping order. Per-field failures
    /// never surface as an error here: they go to the error sink (or the
    /// log), and with rollback enabled they erase every target written
    /// earlier in this call and stop the remaining fields.
    #[instrument(skip_all, fields(mappings = self.mappings.len()))]
    pub async fn apply_conversions(&self, record: &mut Value) -> ConversionReport {
        let mut report = ConversionReport {
            fields: Vec::with_capacity(self.mappings.len()),
        };
        let mut written: Vec<usize> = Vec::new();

        for (index, mapping) in self.mappings.iter().enumerate() {
            let outcome = match self.convert_field(record, mapping).await {
                FieldStep::Converted(result) => {
                    if path::set(record, &mapping.target, result.to_value()) {
                        debug!(target_path = %mapping.target, amount = result.amount, "field converted");
                        written.push(index);
                        FieldOutcome::Converted(result)
                    } else {
                        self.skip(
                            mapping,
                            SkipReason::UnreachableTarget(mapping.target.as_str().to_owned()),
                        )
                    }
                }
                FieldStep::Skipped(reason) => self.skip(mapping, reason),
                FieldStep::Failed {
                    from,
                    to,
                    date,
                    error,
                } => {
                    self.report_failure(mapping, &from, &to, date, &error);
                    FieldOutcome::Failed(error)
                }
            };

            let failed = matches!(outcome, FieldOutcome::Failed(_));
            report.fields.push(FieldReport {
                target_path: mapping.target.as_str().to_owned(),
                outcome,
            });

            if failed && self.rollback_on_error {
                self.roll_back(record, &written, &mut report);
                report
                    .fields
                    .extend(self.mappings[index + 1..].iter().map(|rest| FieldReport {
                        target_path: rest.target.as_str().to_owned(),
                        outcome: FieldOutcome::NotAttempted,
                    }));
                break;
            }
        }

        report
    }

    fn skip(&self, mapping: &CompiledMapping, reason: SkipReason) -> FieldOutcome {
        if !reason.is_silent() {
            self.log.warn(&format!(
                "Skipping conversion of {}: {}",
                mapping.source, reason
            ));
        }
        debug!(target_path = %mapping.target, %reason, "field skipped");
        FieldOutcome::Skipped(reason)
    }

    async fn convert_field(&self, record: &Value, mapping: &CompiledMapping) -> FieldStep {
        if !self.writable.is_writable(mapping.target.as_str()) {
            return FieldStep::Skipped(SkipReason::UnwritableTarget(
                mapping.target.as_str().to_owned(),
            ));
        }

        let amount = match path::get(record, &mapping.source) {
            None | Some(Value::Null) => return FieldStep::Skipped(SkipReason::MissingAmount),
            Some(value) => match coerce::amount(value) {
                Some(amount) => amount,
                None => {
                    return FieldStep::Skipped(SkipReason::InvalidAmount(
                        mapping.source.as_str().to_owned(),
                    ));
                }
            },
        };

        let from = match path::get(record, &mapping.currency) {
            Some(Value::String(code)) if !code.is_empty() => code,
            _ => {
                return FieldStep::Skipped(SkipReason::MissingCurrency(
                    mapping.currency.as_str().to_owned(),
                ));
            }
        };

        let allowed = self.allowed_currencies.as_deref();
        if !is_valid_currency(from, allowed) {
            return FieldStep::Skipped(SkipReason::InvalidSourceCurrency(from.clone()));
        }
        if !is_valid_currency(&mapping.to_currency, allowed) {
            return FieldStep::Skipped(SkipReason::InvalidTargetCurrency(
                mapping.to_currency.clone(),
            ));
        }

        let from = from.to_uppercase();
        let to = mapping.to_currency.to_uppercase();
        let date = self.conversion_date(record, mapping);

        match self.resolve_rate(&from, &to, date).await {
            Ok(rate) => FieldStep::Converted(ConversionResult {
                amount: self.rounding.round(amount * rate),
                currency: to,
                date,
            }),
            Err(error) => FieldStep::Failed {
                from,
                to,
                date,
                error,
            },
        }
    }

    fn conversion_date(&self, record: &Value, mapping: &CompiledMapping) -> DateTime<Utc> {
        let date = mapping
            .date
            .as_ref()
            .and_then(|date_path| path::get(record, date_path))
            .and_then(coerce::date)
            .unwrap_or_else(Utc::now);

        match &self.date_transform {
            Some(transform) => transform.transform(date),
            None => date,
        }
    }

    /// Cache, then resolver, then fallback.
    ///
    /// The fallback only replaces an unusable *returned* rate; a resolver
    /// error is a failure regardless of the fallback.
    async fn resolve_rate(
        &self,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
    ) -> Result<f64, ConversionError> {
        let key = cache_key(from, to, date);

        let cached = match &self.cache {
            Some(cache) => match cache.get(&key).await {
                Ok(hit) => hit,
                Err(e) => {
                    warn!(%key, "Rate cache read failed: {}", e);
                    None
                }
            },
            None => None,
        };

        let rate = match cached {
            Some(rate) => {
                debug!(%key, rate, "rate cache hit");
                rate
            }
            None => {
                let rate = self.resolver.resolve_rate(from, to, date).await?;
                if let Some(cache) = self.cache.as_ref().filter(|_| is_usable_rate(rate)) {
                    if let Err(e) = cache.set(&key, rate).await {
                        warn!(%key, "Rate cache write failed: {}", e);
                    }
                }
                rate
            }
        };

        if is_usable_rate(rate) {
            return Ok(rate);
        }

        match self.fallback_rate.filter(|fallback| is_usable_rate(*fallback)) {
            Some(fallback) => {
                debug!(%key, rate, fallback, "using fallback rate");
                Ok(fallback)
            }
            None => Err(ConversionError::InvalidRate {
                from: from.to_owned(),
                to: to.to_owned(),
                rate,
            }),
        }
    }

    fn report_failure(
        &self,
        mapping: &CompiledMapping,
        from: &str,
        to: &str,
        date: DateTime<Utc>,
        error: &ConversionError,
    ) {
        let context = ErrorContext {
            field: mapping.source.as_str(),
            from_currency: from,
            to_currency: to,
            date,
            error,
        };

        match &self.error_sink {
            Some(sink) => sink.report(&context),
            None => self.log.error(&format!(
                "Currency conversion failed for field {}: {}",
                context.field, error
            )),
        }
    }

    fn roll_back(&self, record: &mut Value, written: &[usize], report: &mut ConversionReport) {
        for &index in written {
            path::remove(record, &self.mappings[index].target);
            report.fields[index].outcome = FieldOutcome::RolledBack;
        }
        debug!(reverted = written.len(), "conversion rolled back");
    }
}

/// Collects mappings and collaborators, validated by [`ConverterBuilder::build`].
#[derive(Default)]
pub struct ConverterBuilder {
    mappings: Vec<FieldMapping>,
    resolver: Option<Arc<dyn RateResolver>>,
    cache: Option<Arc<dyn RateCache>>,
    writable: Option<Arc<dyn WritablePaths>>,
    rounding: Option<Arc<dyn Rounding>>,
    date_transform: Option<Arc<dyn DateTransform>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    log: Option<Arc<dyn ConversionLog>>,
    options: ConversionOptions,
}

impl ConverterBuilder {
    pub fn mapping(mut self, mapping: FieldMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn mappings(mut self, mappings: impl IntoIterator<Item = FieldMapping>) -> Self {
        self.mappings.extend(mappings);
        self
    }

    pub fn resolver(self, resolver: impl RateResolver + 'static) -> Self {
        self.shared_resolver(Arc::new(resolver))
    }

    pub fn shared_resolver(mut self, resolver: Arc<dyn RateResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn cache(self, cache: impl RateCache + 'static) -> Self {
        self.shared_cache(Arc::new(cache))
    }

    pub fn shared_cache(mut self, cache: Arc<dyn RateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn writable_paths(mut self, writable: impl WritablePaths + 'static) -> Self {
        self.writable = Some(Arc::new(writable));
        self
    }

    pub fn rounding(mut self, rounding: impl Rounding + 'static) -> Self {
        self.rounding = Some(Arc::new(rounding));
        self
    }

    pub fn date_transform(mut self, transform: impl DateTransform + 'static) -> Self {
        self.date_transform = Some(Arc::new(transform));
        self
    }

    pub fn on_error(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.error_sink = Some(Arc::new(sink));
        self
    }

    pub fn log(mut self, log: impl ConversionLog + 'static) -> Self {
        self.log = Some(Arc::new(log));
        self
    }

    /// Replaces all plain-data options at once.
    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn allowed_currencies<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.options.allowed_currencies = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn fallback_rate(mut self, rate: f64) -> Self {
        self.options.fallback_rate = Some(rate);
        self
    }

    pub fn rollback_on_error(mut self, enabled: bool) -> Self {
        self.options.rollback_on_error = enabled;
        self
    }

    /// Validates the configuration and builds the converter.
    ///
    /// When no cache was supplied but `cache_ttl_minutes` is set, an
    /// in-memory cache with that TTL is created.
    pub fn build(self) -> Result<CurrencyConverter, ConfigError> {
        if self.mappings.is_empty() {
            return Err(ConfigError::NoMappings);
        }
        let resolver = self.resolver.ok_or(ConfigError::MissingResolver)?;

        let cache = self.cache.or_else(|| {
            self.options.cache_ttl_minutes.map(|minutes| {
                Arc::new(MemoryCache::<f64>::with_ttl_minutes(minutes)) as Arc<dyn RateCache>
            })
        });

        let mappings: Vec<CompiledMapping> =
            self.mappings.into_iter().map(CompiledMapping::from).collect();
        for mapping in &mappings {
            if mapping.target.is_degenerate() {
                warn!(source_path = %mapping.source, "Mapping has an empty target path; it will never be written");
            }
        }

        Ok(CurrencyConverter {
            mappings,
            resolver,
            cache,
            writable: self.writable.unwrap_or_else(|| Arc::new(AnyPathWritable)),
            rounding: self.rounding.unwrap_or_else(|| Arc::new(TwoDecimals)),
            date_transform: self.date_transform,
            error_sink: self.error_sink,
            log: self.log.unwrap_or_else(|| Arc::new(TracingLog)),
            allowed_currencies: self.options.allowed_currencies,
            fallback_rate: self.options.fallback_rate,
            rollback_on_error: self.options.rollback_on_error,
        })
    }
}
