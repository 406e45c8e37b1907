//! Static scheme registering the objective resource.

use std::collections::BTreeMap;

use crate::ports::Scheme;
use crate::spec::{TypeMeta, API_VERSION, KIND};

/// A fixed kind → API version registry.
#[derive(Debug, Clone)]
pub struct StaticScheme {
    kinds: BTreeMap<String, String>,
}

impl StaticScheme {
    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self { kinds: BTreeMap::new() }
    }

    /// Registers `kind` under `api_version`, replacing any earlier entry.
    #[must_use]
    pub fn with_kind(mut self, api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        self.kinds.insert(kind.into(), api_version.into());
        self
    }
}

/// Registers `ServiceLevelObjective` under `pyrra.dev/v1alpha1`.
impl Default for StaticScheme {
    fn default() -> Self {
        Self::empty().with_kind(API_VERSION, KIND)
    }
}

impl Scheme for StaticScheme {
    fn type_meta(&self, kind: &str) -> Option<TypeMeta> {
        self.kinds
            .get(kind)
            .map(|api_version| TypeMeta { api_version: api_version.clone(), kind: kind.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registers_objectives() {
        let meta = StaticScheme::default().type_meta(KIND).unwrap();
        assert_eq!(meta.api_version, "pyrra.dev/v1alpha1");
        assert_eq!(meta.kind, "ServiceLevelObjective");
    }

    #[test]
    fn unknown_kinds_resolve_to_none() {
        assert!(StaticScheme::default().type_meta("Deployment").is_none());
        assert!(StaticScheme::empty().type_meta(KIND).is_none());
    }
}
