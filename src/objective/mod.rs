//! The internal objective record handed to the rule-generation engine.
//!
//! Everything here is a plain value: label matchers are copied out of the
//! parsed query so that two objectives compare equal exactly when their
//! fields do.

mod indicator;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use indicator::{
    BoolGaugeIndicator, Indicator, IndicatorVariant, LatencyIndicator, LatencyNativeIndicator,
    LabelMatcher, Metric, RatioIndicator,
};
pub use crate::promql::{MatchType, METRIC_NAME_LABEL};

/// Default label-key prefix whose labels are copied onto the objective.
pub const PROPAGATION_LABELS_PREFIX: &str = "pyrra.dev/";

/// Alert name used when no override is configured.
pub const DEFAULT_ALERT_NAME: &str = "ErrorBudgetBurn";

/// A single name/value label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Label value.
    pub value: String,
}

impl Label {
    /// Builds a label.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value)
    }
}

/// Alerting settings after defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alerting {
    /// No alerts are generated when set.
    pub disabled: bool,
    /// Alert name override; empty means [`DEFAULT_ALERT_NAME`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Alerting {
    /// The alert name to generate, resolving the empty default.
    #[must_use]
    pub fn alert_name(&self) -> &str {
        if self.name.is_empty() {
            DEFAULT_ALERT_NAME
        } else {
            &self.name
        }
    }
}

/// A service level objective ready for rule generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// `__name__`, then `namespace`, then propagated labels.
    pub labels: Vec<Label>,
    /// Annotations of the source resource.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Free text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Target as a fraction in [0, 1].
    pub target: f64,
    /// Rolling window.
    #[serde(with = "crate::duration::serde_prometheus")]
    pub window: Duration,
    /// YAML snapshot of the source resource, for auditing.
    pub config: String,
    /// Alerting settings.
    pub alerting: Alerting,
    /// The translated indicator.
    pub indicator: Indicator,
}

impl Objective {
    /// Value of the `__name__` label, empty when missing.
    #[must_use]
    pub fn name(&self) -> &str {
        self.label(METRIC_NAME_LABEL).unwrap_or_default()
    }

    /// Value of a label by name.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.iter().find(|l| l.name == name).map(|l| l.value.as_str())
    }

    /// Share of events allowed to fail within the window.
    #[must_use]
    pub fn error_budget(&self) -> f64 {
        1.0 - self.target
    }

    /// Grouping of the active indicator, empty when none is set.
    #[must_use]
    pub fn grouping(&self) -> &[String] {
        self.indicator.kind().map(|kind| kind.grouping()).unwrap_or_default()
    }
}
