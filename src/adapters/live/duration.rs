//! Live duration parser using Prometheus duration syntax.

use std::time::Duration;

use crate::duration::parse_duration;
use crate::error::SourceError;
use crate::ports::DurationParser;

/// Parses durations such as `28d`, `1h30m` or `250ms`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusDurations;

impl DurationParser for PrometheusDurations {
    fn parse_duration(&self, text: &str) -> Result<Duration, SourceError> {
        Ok(parse_duration(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_through_the_port() {
        let parser: &dyn DurationParser = &PrometheusDurations;
        assert_eq!(parser.parse_duration("2h").unwrap(), Duration::from_secs(7200));
        let err = parser.parse_duration("two hours").unwrap_err();
        assert!(err.to_string().contains("not a valid duration string"));
    }
}
