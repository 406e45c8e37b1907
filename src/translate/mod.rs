//! Translation of a `ServiceLevelObjective` into the internal [`Objective`].
//!
//! Translation fails fast: the first error aborts and no partial objective
//! is returned. The source resource is never modified.

mod snapshot;

use std::time::Duration;

use tracing::debug;

use crate::context::ServiceContext;
use crate::error::SloError;
use crate::objective::{
    Alerting, BoolGaugeIndicator, Indicator, Label, LabelMatcher, LatencyIndicator,
    LatencyNativeIndicator, Metric, Objective, RatioIndicator, METRIC_NAME_LABEL,
};
use crate::spec::{self, ServiceLevelObjective};

/// Translates a resource into an objective.
///
/// # Errors
///
/// Returns [`SloError::Parse`] for an unparsable target, window, latency
/// threshold or query, [`SloError::Shape`] for a query that is not a bare
/// vector selector, [`SloError::Conflict`] for mutually exclusive
/// indicators and [`SloError::ConfigSerialization`] if the snapshot fails.
pub fn translate(ctx: &ServiceContext, slo: &ServiceLevelObjective) -> Result<Objective, SloError> {
    let target: f64 = slo
        .spec
        .target
        .parse()
        .map_err(|err| SloError::parse("objective target", err))?;
    let window = ctx
        .durations
        .parse_duration(&slo.spec.window)
        .map_err(|err| SloError::parse("objective window", err))?;

    let alerting = Alerting {
        disabled: slo.spec.alerting.disabled.unwrap_or(false),
        name: slo.spec.alerting.name.clone(),
    };

    check_conflicts(ctx, &slo.spec.indicator)?;
    let indicator = translate_indicator(ctx, &slo.spec.indicator)?;
    let config = snapshot::config_snapshot(ctx, slo)?;
    let labels = objective_labels(ctx, slo);

    debug!(
        name = slo.name(),
        namespace = slo.namespace(),
        target,
        window = %crate::duration::format_duration(window),
        "translated objective"
    );

    Ok(Objective {
        labels,
        annotations: slo.metadata.annotations.clone(),
        description: slo.spec.description.clone(),
        target: target / 100.0,
        window,
        config,
        alerting,
        indicator,
    })
}

fn check_conflicts(
    ctx: &ServiceContext,
    indicator: &spec::ServiceLevelIndicator,
) -> Result<(), SloError> {
    if indicator.ratio.is_some() && indicator.latency.is_some() {
        return Err(SloError::conflict("ratio", "latency"));
    }
    if ctx.config.strict_indicators {
        let populated = indicator.populated();
        if let [first, second, ..] = populated.as_slice() {
            return Err(SloError::conflict(first.field_name(), second.field_name()));
        }
    }
    Ok(())
}

fn translate_indicator(
    ctx: &ServiceContext,
    source: &spec::ServiceLevelIndicator,
) -> Result<Indicator, SloError> {
    let mut indicator = Indicator::default();

    if let Some(ratio) = &source.ratio {
        let total = metric(ctx, "ratio total", &ratio.total.metric)?;
        let errors = metric(ctx, "ratio errors", &ratio.errors.metric)?;
        indicator.ratio = Some(RatioIndicator { errors, total, grouping: ratio.grouping.clone() });
    }

    if let Some(latency) = &source.latency {
        let total = metric(ctx, "latency total", &latency.total.metric)?;
        let success = metric(ctx, "latency success", &latency.success.metric)?;
        indicator.latency =
            Some(LatencyIndicator { success, total, grouping: latency.grouping.clone() });
    }

    if let Some(native) = &source.latency_native {
        let latency = parse_latency(ctx, &native.latency)?;
        indicator.latency_native = Some(LatencyNativeIndicator {
            latency,
            total: metric(ctx, "latencyNative total", &native.total.metric)?,
            grouping: native.grouping.clone(),
        });
    }

    if let Some(gauge) = &source.bool_gauge {
        indicator.bool_gauge = Some(BoolGaugeIndicator {
            metric: metric(ctx, "bool gauge", &gauge.query.metric)?,
            grouping: gauge.grouping.clone(),
        });
    }

    Ok(indicator)
}

fn parse_latency(ctx: &ServiceContext, latency: &str) -> Result<Duration, SloError> {
    ctx.durations
        .parse_duration(latency)
        .map_err(|err| SloError::parse("objective latency", err))
}

/// Parses `query` and copies its selector out as a [`Metric`].
fn metric(ctx: &ServiceContext, field: &str, query: &str) -> Result<Metric, SloError> {
    let expr = ctx
        .queries
        .parse_expr(query)
        .map_err(|err| SloError::parse(format!("{field} metric"), err))?;
    let Some(selector) = expr.as_vector_selector() else {
        debug!(field, node = expr.node_name(), "query is not a vector selector");
        return Err(SloError::shape(field));
    };

    Ok(Metric::new(
        selector.name.clone().unwrap_or_default(),
        selector.matchers.iter().map(LabelMatcher::from).collect(),
    ))
}

/// `__name__`, then `namespace` when set, then propagated labels in key order.
fn objective_labels(ctx: &ServiceContext, slo: &ServiceLevelObjective) -> Vec<Label> {
    let mut labels = vec![Label::new(METRIC_NAME_LABEL, slo.name())];
    if !slo.namespace().is_empty() {
        labels.push(Label::new("namespace", slo.namespace()));
    }
    labels.extend(
        slo.metadata
            .labels
            .iter()
            .filter(|(key, _)| key.starts_with(&ctx.config.propagation_prefix))
            .map(|(key, value)| Label::new(key.as_str(), value.as_str())),
    );
    labels
}
