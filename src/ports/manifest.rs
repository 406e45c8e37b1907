//! Manifest source port.

use std::path::Path;

use crate::error::SourceError;

/// Reads resource manifests.
///
/// Abstracting the source lets the CLI read from disk or stdin and lets
/// tests serve manifests from memory.
pub trait ManifestSource: Send + Sync {
    /// Reads the manifest at `path` as UTF-8 text. The path `-` means stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read.
    fn read_manifest(&self, path: &Path) -> Result<String, SourceError>;
}
