//! The `ServiceLevelObjective` resource envelope.

use serde::{Deserialize, Serialize};

use super::meta::{ObjectMeta, TypeMeta};
use super::slo_spec::ServiceLevelObjectiveSpec;

/// A service level objective as stored by the resource store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelObjective {
    /// `apiVersion` and `kind`.
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    /// Object metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state.
    #[serde(default)]
    pub spec: ServiceLevelObjectiveSpec,
    /// Observed state.
    #[serde(default, skip_serializing_if = "ServiceLevelObjectiveStatus::is_empty")]
    pub status: ServiceLevelObjectiveStatus,
}

impl ServiceLevelObjective {
    /// The identifying name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The namespace, empty when unset.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// Observed state of a `ServiceLevelObjective`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceLevelObjectiveStatus {
    /// Generated resource type, like `PrometheusRule` or `ConfigMap`.
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl ServiceLevelObjectiveStatus {
    /// Returns `true` when nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: pyrra.dev/v1alpha1
kind: ServiceLevelObjective
metadata:
  name: api-errors
  namespace: prod
  labels:
    pyrra.dev/team: payments
  uid: 5b7f6c2e-8d4b-4f0a-9b8e-1f2a3b4c5d6e
  creationTimestamp: "2024-05-01T12:00:00Z"
  managedFields:
    - manager: kubectl
      operation: Apply
      apiVersion: pyrra.dev/v1alpha1
      fieldsType: FieldsV1
      fieldsV1:
        f:spec: {}
spec:
  target: "99.5"
  window: 28d
  indicator:
    ratio:
      errors:
        metric: http_requests_total{job="api",code=~"5.."}
      total:
        metric: http_requests_total{job="api"}
      grouping: [handler]
status:
  type: PrometheusRule
"#;

    #[test]
    fn deserializes_full_manifest() {
        let slo: ServiceLevelObjective = serde_yaml::from_str(MANIFEST).unwrap();

        assert_eq!(slo.type_meta.api_version, "pyrra.dev/v1alpha1");
        assert_eq!(slo.type_meta.kind, "ServiceLevelObjective");
        assert_eq!(slo.name(), "api-errors");
        assert_eq!(slo.namespace(), "prod");
        assert_eq!(slo.metadata.labels["pyrra.dev/team"], "payments");
        assert!(slo.metadata.uid.is_some());
        assert!(slo.metadata.creation_timestamp.is_some());
        assert_eq!(slo.metadata.managed_fields.len(), 1);
        assert_eq!(slo.metadata.managed_fields[0].manager, "kubectl");
        assert_eq!(slo.spec.target, "99.5");
        assert_eq!(slo.spec.window, "28d");
        let ratio = slo.spec.indicator.ratio.as_ref().unwrap();
        assert_eq!(ratio.total.metric, r#"http_requests_total{job="api"}"#);
        assert_eq!(ratio.grouping, vec!["handler"]);
        assert_eq!(slo.status.kind, "PrometheusRule");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let slo: ServiceLevelObjective = serde_yaml::from_str("metadata:\n  name: x\n").unwrap();

        assert_eq!(slo.name(), "x");
        assert!(slo.namespace().is_empty());
        assert!(slo.spec.target.is_empty());
        assert!(slo.spec.indicator.kind().is_none());
        assert!(slo.type_meta.is_empty());
    }
}
