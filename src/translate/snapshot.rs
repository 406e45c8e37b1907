//! Audit snapshot of the source resource.

use crate::context::ServiceContext;
use crate::error::SloError;
use crate::spec::{ServiceLevelObjective, KIND};

/// Serializes an independent copy of `slo` with store bookkeeping removed.
///
/// `managedFields` and the last-applied annotation are dropped; the
/// `apiVersion`/`kind` pair is filled in from the scheme when the object
/// arrived without it. `slo` itself is left untouched.
pub(crate) fn config_snapshot(
    ctx: &ServiceContext,
    slo: &ServiceLevelObjective,
) -> Result<String, SloError> {
    let mut copy = slo.clone();

    if copy.type_meta.is_empty() {
        if let Some(type_meta) = ctx.scheme.type_meta(KIND) {
            copy.type_meta = type_meta;
        }
    }
    copy.metadata.managed_fields.clear();
    copy.metadata.annotations.remove(&ctx.config.last_applied_annotation);

    serde_yaml::to_string(&copy).map_err(|source| SloError::ConfigSerialization { source })
}
