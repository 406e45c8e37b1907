//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `pyrra-slo`.
#[derive(Debug, Parser)]
#[command(
    name = "pyrra-slo",
    version,
    about = "Validate ServiceLevelObjective manifests and translate them into objectives"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run admission validation over every object in the manifests.
    Validate {
        /// Manifest files; `-` reads stdin.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Admission operation to simulate.
        #[arg(long, value_enum, default_value_t = Operation::Create)]
        operation: Operation,
    },
    /// Translate every object in the manifests into an internal objective.
    Translate {
        /// Manifest files; `-` reads stdin.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },
}

/// Admission operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// The object is being created.
    Create,
    /// The object is being updated in place.
    Update,
    /// The object is being deleted.
    Delete,
}

/// Serialization format for translated objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML documents separated by `---`.
    Yaml,
    /// A JSON array.
    Json,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, Operation, OutputFormat};
    use clap::Parser;

    #[test]
    fn parses_validate_subcommand() {
        let cli = Cli::parse_from(["pyrra-slo", "validate", "a.yaml", "b.yaml"]);
        match cli.command {
            Command::Validate { files, operation } => {
                assert_eq!(files.len(), 2);
                assert_eq!(operation, Operation::Create);
            }
            Command::Translate { .. } => panic!("expected validate"),
        }
    }

    #[test]
    fn parses_operation_flag() {
        let cli = Cli::parse_from(["pyrra-slo", "validate", "--operation", "delete", "-"]);
        assert!(matches!(cli.command, Command::Validate { operation: Operation::Delete, .. }));
    }

    #[test]
    fn parses_translate_output() {
        let cli = Cli::parse_from(["pyrra-slo", "translate", "--output", "json", "slo.yaml"]);
        assert!(matches!(cli.command, Command::Translate { output: OutputFormat::Json, .. }));
    }

    #[test]
    fn requires_files() {
        assert!(Cli::try_parse_from(["pyrra-slo", "translate"]).is_err());
    }
}
