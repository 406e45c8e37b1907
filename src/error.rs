//! Errors raised while validating or translating a `ServiceLevelObjective`.

use thiserror::Error;

/// Boxed error from a consumed capability (duration or query parser).
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// A fatal validation or translation failure.
#[derive(Debug, Error)]
pub enum SloError {
    /// A required field or indicator variant is absent.
    #[error("{field} must be set")]
    MissingField {
        /// Human-readable field path.
        field: String,
    },

    /// The target lies outside [0, 100].
    #[error("{field} must be between 0 and 100, got {value}")]
    Range {
        /// Human-readable field path.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// A target, window, latency threshold or query failed to parse.
    #[error("failed to parse {field}: {source}")]
    Parse {
        /// Human-readable field path.
        field: String,
        /// The parser's own error.
        #[source]
        source: SourceError,
    },

    /// A query parsed but is not a single vector selector.
    #[error("{field} metric is not a VectorSelector")]
    Shape {
        /// Human-readable field path.
        field: String,
    },

    /// Two mutually exclusive indicator kinds are populated.
    #[error("cannot have {first} and {second} indicators at the same time")]
    Conflict {
        /// The first populated variant.
        first: String,
        /// The second populated variant.
        second: String,
    },

    /// The audit snapshot could not be serialized.
    #[error("failed to marshal resource as config: {source}")]
    ConfigSerialization {
        /// The serializer's error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl SloError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub(crate) fn parse(field: impl Into<String>, source: impl Into<SourceError>) -> Self {
        Self::Parse { field: field.into(), source: source.into() }
    }

    pub(crate) fn shape(field: impl Into<String>) -> Self {
        Self::Shape { field: field.into() }
    }

    pub(crate) fn conflict(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::Conflict { first: first.into(), second: second.into() }
    }
}
