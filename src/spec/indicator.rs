//! Indicator variants of a service level objective.
//!
//! The wire form carries four optional fields. [`ServiceLevelIndicator::kind`]
//! is the one place that decides which of them is active.

use serde::{Deserialize, Serialize};

/// The underlying indicator, a Prometheus metric. Exactly one variant
/// should be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLevelIndicator {
    /// Errors over total events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioIndicator>,
    /// Share of requests faster than a histogram bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyIndicator>,
    /// Share of requests faster than a threshold, using native histograms.
    #[serde(default, rename = "latencyNative", skip_serializing_if = "Option::is_none")]
    pub latency_native: Option<NativeLatencyIndicator>,
    /// Whether a boolean gauge reports success.
    #[serde(default, rename = "bool_gauge", skip_serializing_if = "Option::is_none")]
    pub bool_gauge: Option<BoolGaugeIndicator>,
}

/// Borrowed view of a single populated indicator variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind<'a> {
    /// See [`RatioIndicator`].
    Ratio(&'a RatioIndicator),
    /// See [`LatencyIndicator`].
    Latency(&'a LatencyIndicator),
    /// See [`NativeLatencyIndicator`].
    LatencyNative(&'a NativeLatencyIndicator),
    /// See [`BoolGaugeIndicator`].
    BoolGauge(&'a BoolGaugeIndicator),
}

impl<'a> IndicatorKind<'a> {
    /// Field name of the variant on the wire.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Ratio(_) => "ratio",
            Self::Latency(_) => "latency",
            Self::LatencyNative(_) => "latencyNative",
            Self::BoolGauge(_) => "bool_gauge",
        }
    }

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

impl ServiceLevelIndicator {
    /// Every populated variant, in resolution order.
    #[must_use]
    pub fn populated(&self) -> Vec<IndicatorKind<'_>> {
        let mut kinds = Vec::with_capacity(1);
        if let Some(ratio) = &self.ratio {
            kinds.push(IndicatorKind::Ratio(ratio));
        }
        if let Some(latency) = &self.latency {
            kinds.push(IndicatorKind::Latency(latency));
        }
        if let Some(native) = &self.latency_native {
            kinds.push(IndicatorKind::LatencyNative(native));
        }
        if let Some(gauge) = &self.bool_gauge {
            kinds.push(IndicatorKind::BoolGauge(gauge));
        }
        kinds
    }

    /// The active variant: the first populated one in the order ratio,
    /// latency, latencyNative, `bool_gauge`.
    #[must_use]
    pub fn kind(&self) -> Option<IndicatorKind<'_>> {
        self.populated().into_iter().next()
    }
}

/// A PromQL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The PromQL expression, expected to be a single vector selector.
    #[serde(default)]
    pub metric: String,
}

impl Query {
    /// Wraps an expression.
    #[must_use]
    pub fn new(metric: impl Into<String>) -> Self {
        Self { metric: metric.into() }
    }
}

/// Errors over total events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioIndicator {
    /// How many errors there are.
    #[serde(default)]
    pub errors: Query,
    /// How many requests there are in total.
    #[serde(default)]
    pub total: Query,
    /// Labels to fan the objective out by, e.g. HTTP handlers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// Successful (fast enough) over total requests, from a histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyIndicator {
    /// How many requests were fast enough.
    #[serde(default)]
    pub success: Query,
    /// How many requests there are in total.
    #[serde(default)]
    pub total: Query,
    /// Labels to fan the objective out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// Requests faster than a threshold, from a native histogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeLatencyIndicator {
    /// The native histogram of all requests.
    #[serde(default)]
    pub total: Query,
    /// Duration requests should be faster than.
    #[serde(default)]
    pub latency: String,
    /// Labels to fan the objective out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}

/// A gauge reporting 1 for success and 0 for failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolGaugeIndicator {
    /// The gauge query, inlined on the wire as `metric`.
    #[serde(flatten)]
    pub query: Query,
    /// Labels to fan the objective out by.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouping: Vec<String>,
}
