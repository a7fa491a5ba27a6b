//! Error types emitted by the BAL CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use bal_core::FetchError;
use bal_data::ClientBuildError;
use thiserror::Error;

/// Errors emitted by the BAL CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A coordinate lies outside its valid range.
    #[error("{field} {value} is outside [-{limit}, {limit}]")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
    /// Constructing the HTTP data access failed.
    #[error("failed to build data access for {base_url:?}: {source}")]
    BuildDataAccess {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// Starting the async runtime failed.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Loading the streets of the commune failed.
    #[error("failed to load streets: {0}")]
    FetchStreets(#[source] FetchError),
    /// The requested street is not part of the commune.
    #[error("street {id:?} not found in commune {commune}")]
    UnknownStreet { id: String, commune: String },
    /// Serializing the suggestion failed.
    #[error("failed to serialize suggestion: {0}")]
    SerializeSuggestion(#[source] serde_json::Error),
    /// Writing the suggestion failed.
    #[error("failed to write suggestion: {0}")]
    WriteOutput(#[source] std::io::Error),
}
