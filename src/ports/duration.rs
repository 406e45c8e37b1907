//! Duration parser port.

use std::time::Duration;

use crate::error::SourceError;

/// Parses duration strings such as `28d` or `100ms`.
pub trait DurationParser: Send + Sync {
    /// Parses `text` into a duration.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not a valid duration.
    fn parse_duration(&self, text: &str) -> Result<Duration, SourceError>;
}
