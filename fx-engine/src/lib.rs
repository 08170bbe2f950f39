//! # FX Engine
//!
//! Conversion orchestrator and its default collaborators.
//!
//! ## Architecture
//!
//! - `service` - `CurrencyConverter`, which walks the field mappings over a record
//! - `cache` - `MemoryCache`, the default in-process rate cache
//! - `rates` - `StaticRates`, a fixed rate table resolver
//! - `lifecycle/` - adapters between host documents/update payloads and records
//!
//! The converter depends only on the port traits from `fx-types`; resolvers,
//! caches and hooks are injected through `CurrencyConverter::builder()`.

pub mod cache;
mod coerce;
pub mod lifecycle;
pub mod rates;
pub mod service;


pub use cache::MemoryCache;
pub use lifecycle::{ConversionHook, DeclaredPaths};
pub use rates::StaticRates;
pub use service::{ConverterBuilder, CurrencyConverter, cache_key};
