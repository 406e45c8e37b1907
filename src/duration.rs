//! Prometheus duration syntax.
//!
//! Accepts `0` or a sequence of `<n><unit>` terms with units in strictly
//! descending order: `y` (365 days), `w`, `d`, `h`, `m`, `s`, `ms`.

use std::time::Duration;

use thiserror::Error;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: u64 = 7 * MS_PER_DAY;
const MS_PER_YEAR: u64 = 365 * MS_PER_DAY;

/// Units in the order they must appear.
const UNITS: [(&str, u64); 7] = [
    ("y", MS_PER_YEAR),
    ("w", MS_PER_WEEK),
    ("d", MS_PER_DAY),
    ("h", MS_PER_HOUR),
    ("m", MS_PER_MINUTE),
    ("s", MS_PER_SECOND),
    ("ms", 1),
];

/// Largest representable duration, matching a signed 64-bit nanosecond count.
const MAX_MS: u64 = i64::MAX as u64 / 1_000_000;

/// Failure to parse a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The input was empty.
    #[error("empty duration string")]
    Empty,
    /// The input does not follow the duration grammar.
    #[error("not a valid duration string: {0:?}")]
    Invalid(String),
    /// The value does not fit.
    #[error("duration out of range: {0:?}")]
    OutOfRange(String),
}

/// Parses a Prometheus duration such as `28d`, `1h30m` or `250ms`.
///
/// # Errors
///
/// Returns an error when the input is empty, malformed, or overflows.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    if text.is_empty() {
        return Err(DurationError::Empty);
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || DurationError::Invalid(text.to_string());
    let bytes = text.as_bytes();
    let mut pos = 0;
    let mut next_unit = 0;
    let mut total: u64 = 0;

    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if start == pos {
            return Err(invalid());
        }
        let value: u64 =
            text[start..pos].parse().map_err(|_| DurationError::OutOfRange(text.to_string()))?;

        let rest = &text[pos..];
        let unit = if rest.starts_with("ms") {
            6
        } else {
            UNITS[..6]
                .iter()
                .position(|(name, _)| rest.starts_with(name))
                .ok_or_else(invalid)?
        };
        if unit < next_unit {
            return Err(invalid());
        }
        next_unit = unit + 1;
        pos += UNITS[unit].0.len();

        total = value
            .checked_mul(UNITS[unit].1)
            .and_then(|ms| total.checked_add(ms))
            .filter(|ms| *ms <= MAX_MS)
            .ok_or_else(|| DurationError::OutOfRange(text.to_string()))?;
    }

    Ok(Duration::from_millis(total))
}

/// Renders a duration in canonical Prometheus form, e.g. `4w` for 28 days.
///
/// Weeks are only used when they divide the duration exactly. Sub-millisecond
/// precision is dropped.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if ms == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, mult) in UNITS {
        if unit == "w" && ms % mult != 0 {
            continue;
        }
        let count = ms / mult;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            ms -= count * mult;
        }
    }
    out
}

/// Serde helpers for durations stored in Prometheus syntax.
pub mod serde_prometheus {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes a duration with [`super::format_duration`].
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    /// Deserializes a duration with [`super::parse_duration`].
    ///
    /// # Errors
    ///
    /// Fails when the string is not a valid duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
