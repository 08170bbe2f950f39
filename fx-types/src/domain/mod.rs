//! Domain models for the conversion pipeline.

pub mod conversion;
pub mod mapping;

pub use conversion::{
    ConversionReport, ConversionResult, ErrorContext, FieldOutcome, FieldReport, SkipReason,
};
pub use mapping::FieldMapping;
