//! Command-line interface for the BAL address editor.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod suggest;

pub use error::CliError;
use suggest::{SuggestArgs, run_suggest};

pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_BASE_LOCALE: &str = "base-locale";
pub(crate) const ARG_COMMUNE: &str = "commune";
pub(crate) const ARG_STREET: &str = "street";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ENV_BASE_LOCALE: &str = "BAL_CMDS_SUGGEST_BASE_LOCALE";
pub(crate) const ENV_COMMUNE: &str = "BAL_CMDS_SUGGEST_COMMUNE";
pub(crate) const ENV_STREET: &str = "BAL_CMDS_SUGGEST_STREET";
pub(crate) const ENV_LON: &str = "BAL_CMDS_SUGGEST_LON";
pub(crate) const ENV_LAT: &str = "BAL_CMDS_SUGGEST_LAT";

/// Run the BAL CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, or
/// when the address database cannot be queried.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Suggest(args) => run_suggest(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "bal",
    about = "Utilities for editing a Base Adresse Locale",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Suggest a house number for a marker placed along a street.
    Suggest(SuggestArgs),
}

#[cfg(test)]
mod tests;
