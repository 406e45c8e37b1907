//! Type registration port.

use crate::spec::TypeMeta;

/// Resolves registered resource kinds to their serialized type metadata.
pub trait Scheme: Send + Sync {
    /// Returns the `apiVersion`/`kind` pair registered for `kind`, or `None`
    /// when the kind is unknown.
    fn type_meta(&self, kind: &str) -> Option<TypeMeta>;
}
