//! End-to-end conversion scenarios.
//!
//! These drive the public API only: a converter built from mappings plus a
//! resolver, applied to plain JSON records.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fx_engine::{ConversionHook, CurrencyConverter, MemoryCache};
use fx_types::{ErrorContext, FieldMapping, FieldOutcome, RateError, rate_fn};
use serde_json::json;

/// Helper to build the price mapping used across scenarios.
fn price_mapping(target: &str, to: &str) -> FieldMapping {
    FieldMapping::new("price.amount", "price.currency", target, to)
}

#[tokio::test]
async fn scenario_converts_single_field() {
    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("conv", "EUR"))
        .resolver(rate_fn(|from, to, _date| async move {
            match (from.as_str(), to.as_str()) {
                ("USD", "EUR") => Ok(0.85),
                _ => Err(RateError::RateNotAvailable(from, to)),
            }
        }))
        .build()
        .unwrap();
    let mut record = json!({ "price": { "amount": 100, "currency": "USD" } });

    let report = converter.apply_conversions(&mut record).await;

    assert_eq!(report.converted(), 1);
    assert_eq!(record["conv"]["amount"].as_f64(), Some(85.0));
    assert_eq!(record["conv"]["currency"], json!("EUR"));
    assert!(record["conv"]["date"].as_str().is_some_and(|d| d.ends_with('Z')));
    assert_eq!(record["price"], json!({ "amount": 100, "currency": "USD" }));
}

#[tokio::test]
async fn scenario_rollback_erases_successful_sibling() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let errors = Arc::new(AtomicUsize::new(0));
    let sink_errors = errors.clone();

    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("first", "EUR"))
        .mapping(price_mapping("second", "GBP"))
        .resolver(rate_fn(move |_from, _to, _date| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Ok(0.9)
                } else {
                    Err(RateError::ServiceUnavailable("rejected".into()))
                }
            }
        }))
        .rollback_on_error(true)
        .on_error(move |_: &ErrorContext<'_>| {
            sink_errors.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    let mut record = json!({ "price": { "amount": 10, "currency": "USD" } });

    let report = converter.apply_conversions(&mut record).await;

    assert!(record.get("first").is_none());
    assert!(record.get("second").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(report.outcome("first"), Some(&FieldOutcome::RolledBack));
    assert!(report.rolled_back());
}

#[tokio::test]
async fn scenario_cache_hit_suppresses_resolver() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("conv", "EUR").with_date_path("date"))
        .resolver(rate_fn(move |_from, _to, _date| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RateError>(0.85) }
        }))
        .cache(MemoryCache::<f64>::with_ttl_minutes(60))
        .build()
        .unwrap();

    let mut first = json!({
        "price": { "amount": 100, "currency": "USD" },
        "date": "2024-06-10T08:00:00Z"
    });
    let mut second = json!({
        "price": { "amount": 20, "currency": "USD" },
        "date": "2024-06-10T17:45:00Z"
    });

    let _ = converter.apply_conversions(&mut first).await;
    let _ = converter.apply_conversions(&mut second).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second["conv"]["amount"].as_f64(), Some(17.0));
}

#[tokio::test]
async fn scenario_missing_data_is_silent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let errors = Arc::new(AtomicUsize::new(0));
    let sink_errors = errors.clone();

    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("conv", "EUR"))
        .resolver(rate_fn(move |_from, _to, _date| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, RateError>(0.85) }
        }))
        .on_error(move |_: &ErrorContext<'_>| {
            sink_errors.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();
    let mut record = json!({ "name": "no price here" });

    let report = converter.apply_conversions(&mut record).await;

    assert_eq!(record, json!({ "name": "no price here" }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert!(matches!(report.outcome("conv"), Some(FieldOutcome::Skipped(_))));
}

#[tokio::test]
async fn scenario_fallback_rate_replaces_nan() {
    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("conv", "EUR"))
        .resolver(rate_fn(|_from, _to, _date| async { Ok::<_, RateError>(f64::NAN) }))
        .fallback_rate(2.0)
        .build()
        .unwrap();
    let mut record = json!({ "price": { "amount": 10, "currency": "USD" } });

    let _ = converter.apply_conversions(&mut record).await;

    assert_eq!(record["conv"]["amount"].as_f64(), Some(20.0));
}

#[tokio::test]
async fn scenario_converter_is_shared_across_tasks() {
    let converter = Arc::new(
        CurrencyConverter::builder()
            .mapping(price_mapping("conv", "EUR"))
            .resolver(rate_fn(|_from, _to, _date| async { Ok::<_, RateError>(0.5) }))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (1..=8)
        .map(|amount| {
            let converter = converter.clone();
            tokio::spawn(async move {
                let mut record = json!({ "price": { "amount": amount, "currency": "USD" } });
                let _ = converter.apply_conversions(&mut record).await;
                record["conv"]["amount"].as_f64()
            })
        })
        .collect();

    for (index, handle) in handles.into_iter().enumerate() {
        let expected = (index + 1) as f64 * 0.5;
        assert_eq!(handle.await.unwrap(), Some(expected));
    }
}

#[tokio::test]
async fn scenario_hook_converts_update_payload() {
    let converter = CurrencyConverter::builder()
        .mapping(price_mapping("price_eur", "EUR"))
        .resolver(rate_fn(|_from, _to, _date| async { Ok::<_, RateError>(0.85) }))
        .build()
        .unwrap();
    let hook = ConversionHook::new(converter);
    let mut update = json!({ "$set": { "price.amount": 200, "price.currency": "USD" } });

    let report = hook.apply_to_update(&mut update).await.unwrap();

    assert_eq!(report.converted(), 1);
    assert_eq!(update["$set"]["price_eur"]["amount"].as_f64(), Some(170.0));
    assert_eq!(update["$set"]["price.amount"], json!(200));
}
