//! Port traits defining external boundaries.
//!
//! Each trait represents a capability the validator and translator consume
//! but do not own: duration parsing, query parsing, type registration, and
//! reading manifests. Implementations live in `src/adapters/`.

pub mod duration;
pub mod manifest;
pub mod query;
pub mod scheme;

pub use duration::DurationParser;
pub use manifest::ManifestSource;
pub use query::QueryParser;
pub use scheme::Scheme;
