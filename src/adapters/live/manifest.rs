//! Live manifest source reading files or stdin.

use std::io::Read;
use std::path::Path;

use crate::error::SourceError;
use crate::ports::ManifestSource;

/// Reads manifests from disk, or from stdin for the path `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveManifestSource;

impl ManifestSource for LiveManifestSource {
    fn read_manifest(&self, path: &Path) -> Result<String, SourceError> {
        if path == Path::new("-") {
            let mut contents = String::new();
            std::io::stdin().read_to_string(&mut contents)?;
            return Ok(contents);
        }
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_files_from_disk() {
        let dir = std::env::temp_dir().join("pyrra_slo_manifest_source_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("slo.yaml");
        std::fs::write(&path, "metadata:\n  name: x\n").unwrap();

        let contents = LiveManifestSource.read_manifest(&path).unwrap();
        assert_eq!(contents, "metadata:\n  name: x\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = Path::new("/nonexistent/pyrra-slo/slo.yaml");
        assert!(LiveManifestSource.read_manifest(path).is_err());
    }
}
