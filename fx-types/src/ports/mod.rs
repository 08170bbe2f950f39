//! Port traits (interfaces for collaborators).
//!
//! These are the contracts the converter depends on. Rate sources, caches
//! and schema hooks are injected as implementations of these traits.

mod cache;
mod hooks;
mod rates;

pub use cache::{CacheError, RateCache};
pub use hooks::{
    AnyPathWritable, ConversionLog, DateTransform, ErrorSink, Rounding, TracingLog, TwoDecimals,
    WritablePaths, round_half_up,
};
pub use rates::{FnResolver, RateError, RateResolver, rate_fn};
