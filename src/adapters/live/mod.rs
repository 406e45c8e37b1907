//! Live adapters backing the ports with the crate's own parsers.

pub mod duration;
pub mod manifest;
pub mod query;
pub mod scheme;

pub use duration::PrometheusDurations;
pub use manifest::LiveManifestSource;
pub use query::PromqlParser;
pub use scheme::StaticScheme;
