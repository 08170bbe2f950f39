//! Integration tests for the HTTP rate resolver against an in-process API.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{TimeZone, Utc};
use fx_client::HttpRateResolver;
use fx_engine::CurrencyConverter;
use fx_types::{FieldMapping, RateError, RateResolver};
use serde_json::json;

async fn rates(
    Path(date): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let from = params.get("from").map(String::as_str);
    let to = params.get("to").map(String::as_str);

    match (date.as_str(), from, to) {
        ("2024-03-01", Some("USD"), Some("EUR")) => {
            Json(json!({ "rates": { "EUR": 0.85 } })).into_response()
        }
        ("2024-03-01", Some("USD"), Some("CHF")) => Json(json!({ "rates": {} })).into_response(),
        ("2024-03-01", Some("USD"), Some("GBP")) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "upstream down" })),
        )
            .into_response(),
        ("2024-01-01", _, _) => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "rates": { "EUR": 1.0 } })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Helper to start the rates API on an ephemeral port.
async fn spawn_rates_api() -> String {
    let app = Router::new().route("/rates/{date}", get(rates));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/rates", addr)
}

#[tokio::test]
async fn test_resolves_published_rate() {
    let base_url = spawn_rates_api().await;
    let resolver = HttpRateResolver::new(base_url).unwrap();
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();

    let rate = resolver.resolve_rate("USD", "EUR", date).await;

    assert_eq!(rate, Ok(0.85));
}

#[tokio::test]
async fn test_unknown_pair_is_not_available() {
    let base_url = spawn_rates_api().await;
    let resolver = HttpRateResolver::new(base_url).unwrap();
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    assert_eq!(
        resolver.resolve_rate("USD", "JPY", date).await,
        Err(RateError::RateNotAvailable("USD".into(), "JPY".into()))
    );
    assert_eq!(
        resolver.resolve_rate("USD", "CHF", date).await,
        Err(RateError::RateNotAvailable("USD".into(), "CHF".into()))
    );
}

#[tokio::test]
async fn test_server_error_is_service_unavailable() {
    let base_url = spawn_rates_api().await;
    let resolver = HttpRateResolver::new(base_url).unwrap();
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    assert_eq!(
        resolver.resolve_rate("USD", "GBP", date).await,
        Err(RateError::ServiceUnavailable("503 - upstream down".into()))
    );
}

#[tokio::test]
async fn test_slow_api_times_out() {
    let base_url = spawn_rates_api().await;
    let resolver = HttpRateResolver::with_timeout(base_url, Duration::from_millis(200)).unwrap();
    let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(
        resolver.resolve_rate("USD", "EUR", date).await,
        Err(RateError::Timeout)
    );
}

#[tokio::test]
async fn test_converter_uses_http_resolver() {
    let base_url = spawn_rates_api().await;
    let converter = CurrencyConverter::builder()
        .mapping(
            FieldMapping::new("price.amount", "price.currency", "price_eur", "EUR")
                .with_date_path("created_at"),
        )
        .resolver(HttpRateResolver::new(base_url).unwrap())
        .build()
        .unwrap();
    let mut record = json!({
        "price": { "amount": 40, "currency": "USD" },
        "created_at": "2024-03-01"
    });

    let report = converter.apply_conversions(&mut record).await;

    assert_eq!(report.converted(), 1);
    assert_eq!(record["price_eur"]["amount"].as_f64(), Some(34.0));
    assert_eq!(record["price_eur"]["date"], json!("2024-03-01T00:00:00.000Z"));
}
