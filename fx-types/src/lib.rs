//! # FX Types
//!
//! Domain types, the path accessor and port traits for the field-level
//! currency conversion pipeline. Nothing in here performs IO - only data
//! structures, tree addressing and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the conversion pipeline:
//! - `domain/` - Field mappings, conversion results, per-field outcomes
//! - `path` - Dotted-path get/set/remove over nested JSON records
//! - `ports/` - Trait definitions for rate resolvers, caches and hooks
//! - `options` - Serializable converter options
//! - `error` - Configuration, conversion and port error types

pub mod domain;
pub mod error;
pub mod options;
pub mod path;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ConversionReport, ConversionResult, ErrorContext, FieldMapping, FieldOutcome, FieldReport,
    SkipReason,
};
pub use error::{ConfigError, ConversionError, LifecycleError};
pub use options::ConversionOptions;
pub use path::{AsPath, FieldPath, Node};
pub use ports::{
    AnyPathWritable, CacheError, ConversionLog, DateTransform, ErrorSink, FnResolver, RateCache,
    RateError, RateResolver, Rounding, TracingLog, TwoDecimals, WritablePaths, rate_fn,
};
