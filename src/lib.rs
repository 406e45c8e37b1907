//! Validation and translation of `ServiceLevelObjective` resources.
//!
//! [`validate::validate`] gates resources at admission time;
//! [`translate::translate`] turns an accepted resource into the
//! [`objective::Objective`] consumed by rule generation. Both take a
//! [`context::ServiceContext`] carrying the parsers they depend on.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod duration;
pub mod error;
pub mod manifest;
pub mod objective;
pub mod ports;
pub mod promql;
pub mod spec;
pub mod translate;
pub mod validate;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["pyrra-slo", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_manifest() {
        let result = run(["pyrra-slo", "validate", "/nonexistent/pyrra-slo.yaml"]);
        assert!(result.unwrap_err().starts_with("failed to read /nonexistent/pyrra-slo.yaml"));
    }
}
