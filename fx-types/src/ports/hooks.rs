//! Optional collaborators injected into the converter.
//!
//! Each capability has a trait plus a blanket impl for plain closures, so
//! callers can pass either a named type or `|x| ...`.

use chrono::{DateTime, Utc};

use crate::domain::ErrorContext;

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

/// Answers whether the host schema declares a path.
///
/// Only used to warn about misconfigured target paths.
pub trait WritablePaths: Send + Sync {
    fn is_writable(&self, path: &str) -> bool;
}

/// Treats every path as writable. Used when no schema is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyPathWritable;

impl WritablePaths for AnyPathWritable {
    fn is_writable(&self, _path: &str) -> bool {
        true
    }
}

impl<F> WritablePaths for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_writable(&self, path: &str) -> bool {
        self(path)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rounding
// ─────────────────────────────────────────────────────────────────────────────

pub trait Rounding: Send + Sync {
    fn round(&self, value: f64) -> f64;
}

/// Default rounding: two decimal places, halves rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoDecimals;

impl Rounding for TwoDecimals {
    fn round(&self, value: f64) -> f64 {
        round_half_up(value, 2)
    }
}

impl<F> Rounding for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn round(&self, value: f64) -> f64 {
        self(value)
    }
}

/// Rounds to `decimals` places; exact halves go towards positive infinity.
///
/// `1.235 -> 1.24`, `-2.567 -> -2.57`, `-0.125 -> -0.12`.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

// ─────────────────────────────────────────────────────────────────────────────
// Dates
// ─────────────────────────────────────────────────────────────────────────────

/// Rewrites the conversion date before it is used for caching, lookup and output.
pub trait DateTransform: Send + Sync {
    fn transform(&self, date: DateTime<Utc>) -> DateTime<Utc>;
}

impl<F> DateTransform for F
where
    F: Fn(DateTime<Utc>) -> DateTime<Utc> + Send + Sync,
{
    fn transform(&self, date: DateTime<Utc>) -> DateTime<Utc> {
        self(date)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reporting
// ─────────────────────────────────────────────────────────────────────────────

/// Receives per-field conversion failures.
pub trait ErrorSink: Send + Sync {
    fn report(&self, context: &ErrorContext<'_>);
}

impl<F> ErrorSink for F
where
    F: Fn(&ErrorContext<'_>) + Send + Sync,
{
    fn report(&self, context: &ErrorContext<'_>) {
        self(context)
    }
}

/// Destination for skip warnings and unhandled failure lines.
pub trait ConversionLog: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default log: forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ConversionLog for TracingLog {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "fx_engine", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "fx_engine", "{message}");
    }
}
