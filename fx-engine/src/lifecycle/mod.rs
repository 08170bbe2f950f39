//! Lifecycle adapters (host documents in, converted documents out).

mod hook;
mod schema;

pub use hook::ConversionHook;
pub use schema::DeclaredPaths;
