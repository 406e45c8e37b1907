//! Desired state of a service level objective.

use serde::{Deserialize, Serialize};

use super::indicator::ServiceLevelIndicator;

/// Desired state of a `ServiceLevelObjective`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelObjectiveSpec {
    /// Describes the objective in more detail for engineers that might not
    /// directly work on the service.
    #[serde(default)]
    pub description: String,
    /// Percentage between 0 and 100, kept as a string on the wire.
    #[serde(default)]
    pub target: String,
    /// Rolling window the target is kept within, e.g. `28d`.
    #[serde(default)]
    pub window: String,
    /// The metric backing the objective.
    #[serde(default)]
    pub indicator: ServiceLevelIndicator,
    /// Overrides for generated alerts.
    #[serde(default, skip_serializing_if = "Alerting::is_empty")]
    pub alerting: Alerting,
}

/// Alerting overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alerting {
    /// Disables alert generation. Recording rules are still generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Alert name; the downstream default applies when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Alerting {
    /// Returns `true` when no override is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disabled.is_none() && self.name.is_empty()
    }
}
