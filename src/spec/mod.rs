//! ServiceLevelObjective resource types.
//!
//! Defines the Rust types that mirror the `pyrra.dev/v1alpha1`
//! `ServiceLevelObjective` schema. These are deserialized from manifests,
//! checked by `validate`, and consumed by `translate`.

mod indicator;
mod meta;
mod resource;
mod slo_spec;

pub use indicator::{
    BoolGaugeIndicator, IndicatorKind, LatencyIndicator, NativeLatencyIndicator, Query,
    RatioIndicator, ServiceLevelIndicator,
};
pub use meta::{ManagedFieldsEntry, ObjectMeta, TypeMeta};
pub use resource::{ServiceLevelObjective, ServiceLevelObjectiveStatus};
pub use slo_spec::{Alerting, ServiceLevelObjectiveSpec};

/// API group and version of the `ServiceLevelObjective` resource.
pub const API_VERSION: &str = "pyrra.dev/v1alpha1";

/// Kind name of the `ServiceLevelObjective` resource.
pub const KIND: &str = "ServiceLevelObjective";
