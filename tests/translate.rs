//! End-to-end tests of the library API: manifest in, objective out.

use std::time::Duration;

use pretty_assertions::assert_eq;
use pyrra_slo::context::ServiceContext;
use pyrra_slo::manifest;
use pyrra_slo::objective::{
    Alerting, Indicator, Label, LabelMatcher, LatencyIndicator, MatchType, Metric, Objective,
};
use pyrra_slo::translate::translate;
use pyrra_slo::validate::validate;

const LATENCY: &str = r#"
apiVersion: pyrra.dev/v1alpha1
kind: ServiceLevelObjective
metadata:
  name: api-latency
  namespace: prod
  uid: 6f1c1a52-8c41-4d6e-9d7a-3f1f1f8b2a10
  generation: 3
  creationTimestamp: "2024-03-01T12:00:00Z"
  labels:
    pyrra.dev/team: payments
    app.kubernetes.io/name: api
  annotations:
    kubectl.kubernetes.io/last-applied-configuration: '{"apiVersion":"pyrra.dev/v1alpha1"}'
    runbook: https://runbooks.example.com/api-latency
  managedFields:
    - manager: kubectl-client-side-apply
      operation: Update
      apiVersion: pyrra.dev/v1alpha1
      fieldsType: FieldsV1
      fieldsV1:
        f:spec: {}
spec:
  description: API requests are served within one second
  target: "99"
  window: 2w
  alerting:
    name: APILatencyBudgetBurn
  indicator:
    latency:
      success:
        metric: http_request_duration_seconds_bucket{job="api",le="1"}
      total:
        metric: http_request_duration_seconds_count{job="api"}
      grouping:
        - route
"#;

fn load(text: &str) -> pyrra_slo::spec::ServiceLevelObjective {
    let mut objectives = manifest::parse(text).expect("manifest parses");
    assert_eq!(objectives.len(), 1);
    objectives.remove(0)
}

#[test]
fn latency_objective_end_to_end() {
    let ctx = ServiceContext::live();
    let slo = load(LATENCY);

    let report = validate(&ctx, &slo);
    assert!(report.is_ok(), "{:?}", report.error);
    assert!(report.warnings.is_empty());

    let objective = translate(&ctx, &slo).expect("translates");
    let expected = Objective {
        labels: vec![
            Label::new("__name__", "api-latency"),
            Label::new("namespace", "prod"),
            Label::new("pyrra.dev/team", "payments"),
        ],
        annotations: slo.metadata.annotations.clone(),
        description: "API requests are served within one second".to_string(),
        target: 0.99,
        window: Duration::from_secs(14 * 24 * 3600),
        config: objective.config.clone(),
        alerting: Alerting { disabled: false, name: "APILatencyBudgetBurn".to_string() },
        indicator: Indicator {
            latency: Some(LatencyIndicator {
                success: Metric::new(
                    "http_request_duration_seconds_bucket",
                    vec![
                        LabelMatcher::new(MatchType::Equal, "job", "api"),
                        LabelMatcher::new(MatchType::Equal, "le", "1"),
                    ],
                ),
                total: Metric::new(
                    "http_request_duration_seconds_count",
                    vec![LabelMatcher::new(MatchType::Equal, "job", "api")],
                ),
                grouping: vec!["route".to_string()],
            }),
            ..Default::default()
        },
    };
    assert_eq!(objective, expected);
}

#[test]
fn config_snapshot_is_clean_yaml_of_the_source() {
    let ctx = ServiceContext::live();
    let slo = load(LATENCY);
    let objective = translate(&ctx, &slo).expect("translates");

    let snapshot = load(&objective.config);
    assert!(snapshot.metadata.managed_fields.is_empty());
    assert_eq!(
        snapshot.metadata.annotations.keys().collect::<Vec<_>>(),
        vec!["runbook"]
    );
    assert_eq!(snapshot.spec, slo.spec);
    assert_eq!(snapshot.metadata.uid, slo.metadata.uid);

    // The source keeps its bookkeeping.
    assert_eq!(slo.metadata.managed_fields.len(), 1);
    assert_eq!(slo.metadata.annotations.len(), 2);
}

#[test]
fn objective_round_trips_through_yaml() {
    let ctx = ServiceContext::live();
    let objective = translate(&ctx, &load(LATENCY)).expect("translates");

    let yaml = serde_yaml::to_string(&objective).expect("serializes");
    let decoded: Objective = serde_yaml::from_str(&yaml).expect("deserializes");
    assert_eq!(decoded, objective);
    let total = &decoded.indicator.latency.as_ref().expect("latency indicator").total;
    assert_eq!(total.to_string(), r#"http_request_duration_seconds_count{job="api"}"#);
}
