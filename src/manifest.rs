//! Loading `ServiceLevelObjective` resources from YAML manifests.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::context::ServiceContext;
use crate::error::SourceError;
use crate::spec::ServiceLevelObjective;

/// Failure to load a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying read error.
        #[source]
        source: SourceError,
    },

    /// A document is not a valid resource.
    #[error("failed to decode document {index} of {}: {source}", path.display())]
    Decode {
        /// Manifest path.
        path: PathBuf,
        /// One-based document index within the file.
        index: usize,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads every resource in the manifest at `path` through the context's
/// [`ManifestSource`](crate::ports::ManifestSource).
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or a document fails to decode.
pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Vec<ServiceLevelObjective>, ManifestError> {
    let text = ctx
        .manifests
        .read_manifest(path)
        .map_err(|source| ManifestError::Read { path: path.to_path_buf(), source })?;
    let objectives = parse(&text).map_err(|(index, source)| ManifestError::Decode {
        path: path.to_path_buf(),
        index,
        source,
    })?;
    debug!(path = %path.display(), count = objectives.len(), "loaded manifest");
    Ok(objectives)
}

/// Parses a possibly multi-document YAML string. Empty documents are skipped.
///
/// # Errors
///
/// Returns the one-based index of the failing document with its error.
pub fn parse(text: &str) -> Result<Vec<ServiceLevelObjective>, (usize, serde_yaml::Error)> {
    let mut objectives = Vec::new();
    for (i, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let index = i + 1;
        let value = serde_yaml::Value::deserialize(document).map_err(|err| (index, err))?;
        if value.is_null() {
            continue;
        }
        objectives.push(serde_yaml::from_value(value).map_err(|err| (index, err))?);
    }
    Ok(objectives)
}
