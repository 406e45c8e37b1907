//! Translated indicators.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::promql::{MatchType, Matcher};

/// A label matcher as a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelMatcher {
    /// Label name.
    pub name: String,
    /// Comparison.
    #[serde(rename = "type")]
    pub match_type: MatchType,
    /// Right-hand side.
    pub value: String,
}

impl LabelMatcher {
    /// Builds a matcher.
    #[must_use]
    pub fn new(match_type: MatchType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), match_type, value: value.into() }
    }
}

impl From<&Matcher> for LabelMatcher {
    fn from(matcher: &Matcher) -> Self {
        Self::new(matcher.match_type, matcher.name.clone(), matcher.value.clone())
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.match_type, self.value)
    }
}

/// A metric name plus the matchers narrowing it down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name.
    pub name: String,
    /// Label matchers in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_matchers: Vec<LabelMatcher>,
}

impl Metric {
    /// Builds a metric.
    #[must_use]
    pub fn new(name: impl Into<String>, label_matchers: Vec<LabelMatcher>) -> Self {
        Self { name: name.into(), label_matchers }
    }
}

/// Renders the metric back as a PromQL selector.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.label_matchers.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (i, matcher) in self.label_matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{matcher}")?;
        }
        f.write_str("}")
    }
}

/// Errors over total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioIndicator {
    /// Error events.
    pub errors: Metric,
    /// All events.
    pub total: Metric,
    /// Labels to fan out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// Fast enough over total, from a classic histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyIndicator {
    /// Requests within the latency bucket.
    pub success: Metric,
    /// All requests.
    pub total: Metric,
    /// Labels to fan out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// Faster than a threshold, from a native histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyNativeIndicator {
    /// Threshold requests should be faster than.
    #[serde(with = "crate::duration::serde_prometheus")]
    pub latency: Duration,
    /// The native histogram.
    pub total: Metric,
    /// Labels to fan out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// A boolean success gauge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolGaugeIndicator {
    /// The gauge.
    pub metric: Metric,
    /// Labels to fan out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// Translated indicators; every variant populated on the source is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    /// See [`RatioIndicator`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioIndicator>,
    /// See [`LatencyIndicator`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyIndicator>,
    /// See [`LatencyNativeIndicator`].
    #[serde(default, rename = "latencyNative", skip_serializing_if = "Option::is_none")]
    pub latency_native: Option<LatencyNativeIndicator>,
    /// See [`BoolGaugeIndicator`].
    #[serde(default, rename = "boolGauge", skip_serializing_if = "Option::is_none")]
    pub bool_gauge: Option<BoolGaugeIndicator>,
}

/// Borrowed view of the active translated indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorVariant<'a> {
    /// See [`RatioIndicator`].
    Ratio(&'a RatioIndicator),
    /// See [`LatencyIndicator`].
    Latency(&'a LatencyIndicator),
    /// See [`LatencyNativeIndicator`].
    LatencyNative(&'a LatencyNativeIndicator),
    /// See [`BoolGaugeIndicator`].
    BoolGauge(&'a BoolGaugeIndicator),
}

impl<'a> IndicatorVariant<'a> {
    /// Grouping labels of the variant.
    #[must_use]
    pub fn grouping(&self) -> &'a [String] {
        match *self {
            Self::Ratio(r) => &r.grouping,
            Self::Latency(l) => &l.grouping,
            Self::LatencyNative(l) => &l.grouping,
            Self::BoolGauge(b) => &b.grouping,
        }
    }
}

impl Indicator {
    /// The first populated variant in the order ratio, latency,
    /// latencyNative, boolGauge.
    #[must_use]
    pub fn kind(&self) -> Option<IndicatorVariant<'_>> {
        if let Some(ratio) = &self.ratio {
            Some(IndicatorVariant::Ratio(ratio))
        } else if let Some(latency) = &self.latency {
            Some(IndicatorVariant::Latency(latency))
        } else if let Some(native) = &self.latency_native {
            Some(IndicatorVariant::LatencyNative(native))
        } else {
            self.bool_gauge.as_ref().map(IndicatorVariant::BoolGauge)
        }
    }
}
