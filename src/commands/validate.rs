//! `pyrra-slo validate` command.

use std::io::Write;
use std::path::PathBuf;

use crate::cli::Operation;
use crate::context::ServiceContext;
use crate::manifest;
use crate::spec::ServiceLevelObjective;
use crate::validate::{format_report, AdmissionHooks, ValidationReport, Validator};

/// Execute the `validate` command.
///
/// Every object is checked even after a rejection so all problems are shown.
///
/// # Errors
///
/// Returns an error string if a manifest cannot be loaded, output cannot be
/// written, or any object is rejected.
pub fn run(
    ctx: &ServiceContext,
    files: &[PathBuf],
    operation: Operation,
    out: &mut dyn Write,
) -> Result<(), String> {
    let validator = Validator::new(ctx);
    let mut rejected = 0_usize;
    let mut total = 0_usize;

    for path in files {
        let objectives = manifest::load(ctx, path).map_err(|err| err.to_string())?;
        for slo in &objectives {
            let report = admit(&validator, operation, slo);
            total += 1;
            if !report.is_ok() {
                rejected += 1;
            }
            writeln!(out, "{}\n", format_report(&subject(slo), &report))
                .map_err(|err| err.to_string())?;
        }
    }

    if rejected > 0 {
        return Err(format!("{rejected} of {total} objectives rejected"));
    }
    Ok(())
}

fn admit(validator: &Validator<'_>, operation: Operation, slo: &ServiceLevelObjective) -> ValidationReport {
    match operation {
        Operation::Create => validator.validate_create(slo),
        // Manifests carry no prior state, so the object is compared to itself.
        Operation::Update => validator.validate_update(slo, slo),
        Operation::Delete => validator.validate_delete(slo),
    }
}

fn subject(slo: &ServiceLevelObjective) -> String {
    match (slo.namespace(), slo.name()) {
        (_, "") => "<unnamed>".to_string(),
        ("", name) => name.to_string(),
        (namespace, name) => format!("{namespace}/{name}"),
    }
}
