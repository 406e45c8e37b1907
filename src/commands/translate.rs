//! `pyrra-slo translate` command.

use std::io::Write;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::context::ServiceContext;
use crate::manifest;
use crate::objective::Objective;
use crate::translate::translate;

/// Execute the `translate` command.
///
/// # Errors
///
/// Returns an error string on the first manifest or translation failure, or
/// if output cannot be written.
pub fn run(
    ctx: &ServiceContext,
    files: &[PathBuf],
    output: OutputFormat,
    out: &mut dyn Write,
) -> Result<(), String> {
    let mut objectives = Vec::new();
    for path in files {
        for slo in manifest::load(ctx, path).map_err(|err| err.to_string())? {
            let objective =
                translate(ctx, &slo).map_err(|err| format!("{}: {err}", slo.name()))?;
            objectives.push(objective);
        }
    }

    let rendered = render(&objectives, output)?;
    out.write_all(rendered.as_bytes()).map_err(|err| err.to_string())
}

fn render(objectives: &[Objective], output: OutputFormat) -> Result<String, String> {
    match output {
        OutputFormat::Json => serde_json::to_string_pretty(objectives)
            .map(|json| json + "\n")
            .map_err(|err| err.to_string()),
        OutputFormat::Yaml => {
            let mut documents = Vec::with_capacity(objectives.len());
            for objective in objectives {
                documents.push(serde_yaml::to_string(objective).map_err(|err| err.to_string())?);
            }
            Ok(documents.join("---\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::ports::ManifestSource;
    use std::path::Path;

    struct InMemory(&'static str);

    impl ManifestSource for InMemory {
        fn read_manifest(&self, _path: &Path) -> Result<String, SourceError> {
            Ok(self.0.to_string())
        }
    }

    const MANIFEST: &str = r#"
metadata:
  name: probes
  namespace: prod
spec:
  target: "99.5"
  window: 2w
  indicator:
    bool_gauge:
      metric: probe_success{job="blackbox"}
"#;

    fn ctx(manifest: &'static str) -> ServiceContext {
        let mut ctx = ServiceContext::live();
        ctx.manifests = Box::new(InMemory(manifest));
        ctx
    }

    #[test]
    fn renders_json() {
        let mut out = Vec::new();
        run(&ctx(MANIFEST), &[PathBuf::from("slo.yaml")], OutputFormat::Json, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["window"], "2w");
        assert_eq!(value[0]["indicator"]["boolGauge"]["metric"]["name"], "probe_success");
    }

    #[test]
    fn renders_yaml_documents() {
        let mut out = Vec::new();
        let files = [PathBuf::from("a.yaml"), PathBuf::from("b.yaml")];
        run(&ctx(MANIFEST), &files, OutputFormat::Yaml, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("---\n").count(), 1);
        assert!(text.contains("window: 2w"));
    }

    #[test]
    fn stops_at_first_translation_error() {
        const BROKEN: &str = "metadata:\n  name: broken\nspec:\n  target: x\n  window: 1d\n";
        let mut out = Vec::new();
        let err = run(&ctx(BROKEN), &[PathBuf::from("slo.yaml")], OutputFormat::Yaml, &mut out)
            .unwrap_err();
        assert!(err.starts_with("broken: failed to parse objective target"));
        assert!(out.is_empty());
    }
}
