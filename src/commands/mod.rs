//! Command dispatch and handlers.

pub mod translate;
pub mod validate;

use std::io::{self, Write};

use crate::cli::Command;
use crate::config::Config;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// Configuration is read from the environment; see [`Config::from_env`].
///
/// # Errors
///
/// Returns an error string if the configuration is invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::with_config(Config::from_env()?);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    dispatch_with_context(command, &ctx, &mut out)
}

/// Dispatch a command with the given service context and output sink.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    out: &mut dyn Write,
) -> Result<(), String> {
    match command {
        Command::Validate { files, operation } => validate::run(ctx, files, *operation, out),
        Command::Translate { files, output } => translate::run(ctx, files, *output, out),
    }
}
