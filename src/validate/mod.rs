//! Admission validation of `ServiceLevelObjective` resources.
//!
//! Checks run in a fixed order and stop at the first fatal problem.
//! Advisory warnings collected before that point are still returned.

use tracing::{debug, warn};

use crate::context::ServiceContext;
use crate::error::SloError;
use crate::spec::{IndicatorKind, RatioIndicator, ServiceLevelObjective};

/// Outcome of validating one resource.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Advisory warnings, in the order they were raised.
    pub warnings: Vec<String>,
    /// The fatal problem that rejected the resource, if any.
    pub error: Option<SloError>,
}

impl ValidationReport {
    /// Returns `true` if the resource is accepted.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the report into warnings and a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the fatal error if the resource was rejected.
    pub fn into_result(self) -> (Vec<String>, Result<(), SloError>) {
        let result = match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        };
        (self.warnings, result)
    }
}

/// Hooks the resource store calls before persisting a change.
pub trait AdmissionHooks {
    /// Validates a resource about to be created.
    fn validate_create(&self, slo: &ServiceLevelObjective) -> ValidationReport;

    /// Validates the new state of a resource about to be updated.
    fn validate_update(
        &self,
        old: &ServiceLevelObjective,
        new: &ServiceLevelObjective,
    ) -> ValidationReport;

    /// Validates a resource about to be deleted.
    fn validate_delete(&self, slo: &ServiceLevelObjective) -> ValidationReport;
}

/// [`AdmissionHooks`] backed by [`validate`].
#[derive(Debug)]
pub struct Validator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Validator<'a> {
    /// Creates a validator using the ports and config in `ctx`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }
}

impl AdmissionHooks for Validator<'_> {
    fn validate_create(&self, slo: &ServiceLevelObjective) -> ValidationReport {
        validate(self.ctx, slo)
    }

    fn validate_update(
        &self,
        _old: &ServiceLevelObjective,
        new: &ServiceLevelObjective,
    ) -> ValidationReport {
        validate(self.ctx, new)
    }

    fn validate_delete(&self, _slo: &ServiceLevelObjective) -> ValidationReport {
        ValidationReport::default()
    }
}

/// Validates a resource.
///
/// Never panics and never mutates `slo`. See the module docs for ordering.
#[must_use]
pub fn validate(ctx: &ServiceContext, slo: &ServiceLevelObjective) -> ValidationReport {
    let mut warnings = Vec::new();
    let error = run_checks(ctx, slo, &mut warnings).err();

    for warning in &warnings {
        warn!(name = slo.name(), namespace = slo.namespace(), "{warning}");
    }
    match &error {
        Some(err) => debug!(name = slo.name(), error = %err, "objective rejected"),
        None => debug!(
            name = slo.name(),
            indicator = indicator_name(slo),
            warnings = warnings.len(),
            "objective accepted"
        ),
    }

    ValidationReport { warnings, error }
}

fn run_checks(
    ctx: &ServiceContext,
    slo: &ServiceLevelObjective,
    warnings: &mut Vec<String>,
) -> Result<(), SloError> {
    if slo.name().is_empty() {
        return Err(SloError::missing("name"));
    }
    if slo.namespace().is_empty() {
        warnings.push("namespace must be set".to_string());
    }

    check_target(&slo.spec.target, warnings)?;

    if slo.spec.window.is_empty() {
        return Err(SloError::missing("window"));
    }
    ctx.durations
        .parse_duration(&slo.spec.window)
        .map_err(|err| SloError::parse("window", err))?;

    let populated = slo.spec.indicator.populated();
    let Some(kind) = populated.first() else {
        return Err(SloError::missing(
            "indicator (one of ratio, latency, latencyNative or bool_gauge)",
        ));
    };
    if ctx.config.strict_indicators {
        if let Some(second) = populated.get(1) {
            return Err(SloError::conflict(kind.field_name(), second.field_name()));
        }
    }

    if let Some(ratio) = &slo.spec.indicator.ratio {
        check_ratio(ctx, ratio, warnings)?;
    }

    Ok(())
}

fn check_target(target: &str, warnings: &mut Vec<String>) -> Result<(), SloError> {
    if target.is_empty() {
        return Err(SloError::missing("target"));
    }
    let value: f64 = target.parse().map_err(|err| SloError::parse("target", err))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(SloError::Range { field: "target".to_string(), value });
    }
    if value > 0.0 && value < 1.0 {
        warnings.push(format!("target is from 0-100 ({}), not 0-1 ({value})", 100.0 * value));
    }
    Ok(())
}

fn check_ratio(
    ctx: &ServiceContext,
    ratio: &RatioIndicator,
    warnings: &mut Vec<String>,
) -> Result<(), SloError> {
    if ratio.total.metric.is_empty() {
        return Err(SloError::missing("ratio total metric"));
    }
    if ratio.errors.metric.is_empty() {
        return Err(SloError::missing("ratio errors metric"));
    }
    if ratio.errors.metric == ratio.total.metric {
        warnings.push("ratio errors metric should be different from ratio total metric".to_string());
    }

    ctx.queries
        .parse_expr(&ratio.total.metric)
        .map_err(|err| SloError::parse("ratio total metric", err))?;
    ctx.queries
        .parse_expr(&ratio.errors.metric)
        .map_err(|err| SloError::parse("ratio errors metric", err))?;
    Ok(())
}

/// Formats a report as human-readable text.
#[must_use]
pub fn format_report(subject: &str, report: &ValidationReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Objective: {subject}"));
    for warning in &report.warnings {
        lines.push(format!("  [WARN] {warning}"));
    }
    match &report.error {
        Some(err) => {
            lines.push(format!("  [FAIL] {err}"));
            lines.push("Result: REJECTED".to_string());
        }
        None => lines.push("Result: ACCEPTED".to_string()),
    }
    lines.join("\n")
}

/// Field name of the first populated indicator, for log context.
#[must_use]
pub fn indicator_name(slo: &ServiceLevelObjective) -> &'static str {
    slo.spec.indicator.kind().as_ref().map_or("none", IndicatorKind::field_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::spec::{
        BoolGaugeIndicator, LatencyIndicator, ObjectMeta, Query, ServiceLevelIndicator,
        ServiceLevelObjectiveSpec,
    };

    fn ratio(errors: &str, total: &str) -> RatioIndicator {
        RatioIndicator { errors: Query::new(errors), total: Query::new(total), grouping: vec![] }
    }

    fn slo(target: &str, window: &str) -> ServiceLevelObjective {
        ServiceLevelObjective {
            metadata: ObjectMeta {
                name: "api-errors".to_string(),
                namespace: "prod".to_string(),
                ..Default::default()
            },
            spec: ServiceLevelObjectiveSpec {
                target: target.to_string(),
                window: window.to_string(),
                indicator: ServiceLevelIndicator {
                    ratio: Some(ratio(
                        r#"http_requests_total{job="api",code=~"5.."}"#,
                        r#"http_requests_total{job="api"}"#,
                    )),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn check(slo: &ServiceLevelObjective) -> ValidationReport {
        validate(&ServiceContext::live(), slo)
    }

    #[test]
    fn accepts_valid_objective() {
        let report = check(&slo("99.9", "28d"));
        assert!(report.is_ok(), "{:?}", report.error);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn target_boundaries() {
        assert!(check(&slo("0", "28d")).is_ok());
        assert!(check(&slo("100", "28d")).is_ok());
        assert!(matches!(check(&slo("101", "28d")).error, Some(SloError::Range { .. })));
        assert!(matches!(check(&slo("-1", "28d")).error, Some(SloError::Range { .. })));
        assert!(matches!(check(&slo("abc", "28d")).error, Some(SloError::Parse { .. })));
        assert!(matches!(
            check(&slo("", "28d")).error,
            Some(SloError::MissingField { ref field }) if field == "target"
        ));
    }

    #[test]
    fn fractional_target_warns() {
        let report = check(&slo("0.5", "28d"));
        assert!(report.is_ok());
        assert_eq!(report.warnings, vec!["target is from 0-100 (50), not 0-1 (0.5)".to_string()]);
    }

    #[test]
    fn window_must_parse() {
        assert!(check(&slo("99", "28d")).is_ok());
        assert!(matches!(check(&slo("99", "notaduration")).error, Some(SloError::Parse { .. })));
        assert!(matches!(
            check(&slo("99", "")).error,
            Some(SloError::MissingField { ref field }) if field == "window"
        ));
    }

    #[test]
    fn name_is_required_and_namespace_only_warns() {
        let mut nameless = slo("99", "28d");
        nameless.metadata.name.clear();
        let report = check(&nameless);
        assert!(matches!(
            report.error,
            Some(SloError::MissingField { ref field }) if field == "name"
        ));

        let mut global = slo("99", "28d");
        global.metadata.namespace.clear();
        let report = check(&global);
        assert!(report.is_ok());
        assert_eq!(report.warnings, vec!["namespace must be set".to_string()]);
    }

    #[test]
    fn warnings_survive_a_later_failure() {
        let mut bad = slo("0.5", "nope");
        bad.metadata.namespace.clear();
        let report = check(&bad);
        assert!(matches!(report.error, Some(SloError::Parse { .. })));
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0], "namespace must be set");
    }

    #[test]
    fn indicator_is_required() {
        let mut empty = slo("99", "28d");
        empty.spec.indicator = ServiceLevelIndicator::default();
        let report = check(&empty);
        match report.error {
            Some(SloError::MissingField { field }) => assert!(field.starts_with("indicator")),
            other => panic!("expected missing indicator, got {other:?}"),
        }
    }

    #[test]
    fn identical_ratio_queries_warn() {
        let mut same = slo("99", "28d");
        same.spec.indicator.ratio = Some(ratio("up", "up"));
        let report = check(&same);
        assert!(report.is_ok());
        assert_eq!(
            report.warnings,
            vec!["ratio errors metric should be different from ratio total metric".to_string()]
        );
    }

    #[test]
    fn ratio_queries_must_be_present_and_parse() {
        let mut missing = slo("99", "28d");
        missing.spec.indicator.ratio = Some(ratio("up", ""));
        assert!(matches!(
            check(&missing).error,
            Some(SloError::MissingField { ref field }) if field == "ratio total metric"
        ));

        let mut broken = slo("99", "28d");
        broken.spec.indicator.ratio = Some(ratio("up{", "up"));
        assert!(matches!(
            check(&broken).error,
            Some(SloError::Parse { ref field, .. }) if field == "ratio errors metric"
        ));
    }

    #[test]
    fn deeply_nested_query_is_rejected() {
        let nested = format!("{}up{}", "(".repeat(10_000), ")".repeat(10_000));
        let mut deep = slo("99", "28d");
        deep.spec.indicator.ratio = Some(ratio("up", &nested));
        assert!(matches!(
            check(&deep).error,
            Some(SloError::Parse { ref field, .. }) if field == "ratio total metric"
        ));
    }

    #[test]
    fn compound_ratio_queries_are_left_to_translation() {
        let mut compound = slo("99", "28d");
        compound.spec.indicator.ratio = Some(ratio("sum(rate(errors[5m]))", "sum(rate(total[5m]))"));
        assert!(check(&compound).is_ok());
    }

    #[test]
    fn multiple_indicators_pass_unless_strict() {
        let mut both = slo("99", "28d");
        both.spec.indicator.bool_gauge =
            Some(BoolGaugeIndicator { query: Query::new("up"), grouping: vec![] });
        both.spec.indicator.latency = Some(LatencyIndicator::default());
        assert!(check(&both).is_ok());

        let strict =
            ServiceContext::with_config(Config { strict_indicators: true, ..Config::default() });
        let report = validate(&strict, &both);
        assert!(matches!(report.error, Some(SloError::Conflict { .. })));
    }

    #[test]
    fn hooks_share_logic_and_delete_is_a_no_op() {
        let ctx = ServiceContext::live();
        let validator = Validator::new(&ctx);
        let bad = slo("101", "28d");

        assert!(!validator.validate_create(&bad).is_ok());
        assert!(!validator.validate_update(&slo("99", "28d"), &bad).is_ok());

        let deleted = validator.validate_delete(&bad);
        assert!(deleted.is_ok());
        assert!(deleted.warnings.is_empty());
    }

    #[test]
    fn report_formatting() {
        let report = check(&slo("0.5", "28d"));
        let text = format_report("prod/api-errors", &report);
        assert!(text.contains("Objective: prod/api-errors"));
        assert!(text.contains("[WARN] target is from 0-100"));
        assert!(text.ends_with("Result: ACCEPTED"));

        let rejected = check(&slo("101", "28d"));
        let text = format_report("prod/api-errors", &rejected);
        assert!(text.contains("[FAIL] target must be between 0 and 100"));
        assert!(text.ends_with("Result: REJECTED"));
    }

    #[test]
    fn into_result_splits_report() {
        let (warnings, result) = check(&slo("0.5", "28d")).into_result();
        assert_eq!(warnings.len(), 1);
        assert!(result.is_ok());
        assert_eq!(indicator_name(&slo("99", "28d")), "ratio");
    }
}
