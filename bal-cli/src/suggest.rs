//! Suggest command implementation for the BAL CLI.

use bal_core::{
    CollectionKind, DataAccess, EntityId, EntityStore, MarkerSuggestionEngine, SessionScope,
};
use bal_data::{HttpDataAccess, HttpDataAccessConfig};
use clap::Parser;
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_BASE_LOCALE, ARG_BASE_URL, ARG_COMMUNE, ARG_LAT, ARG_LON, ARG_STREET, CliError,
    ENV_BASE_LOCALE, ENV_COMMUNE, ENV_LAT, ENV_LON, ENV_STREET,
};

/// CLI arguments for the `suggest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the streets of a commune from the address database and \
                 suggest the house number for a marker placed at the given \
                 longitude and latitude. The suggestion is the distance in \
                 metres from the start of the street trace to the marker's \
                 projection onto it.",
    about = "Suggest a house number for a marker"
)]
#[ortho_config(prefix = "BAL")]
pub(crate) struct SuggestArgs {
    /// Base URL of the address database API.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Identifier of the local address base.
    #[arg(long = ARG_BASE_LOCALE, value_name = "id")]
    #[serde(default)]
    pub(crate) base_locale: Option<String>,
    /// INSEE code of the commune.
    #[arg(long = ARG_COMMUNE, value_name = "code")]
    #[serde(default)]
    pub(crate) commune: Option<String>,
    /// Identifier of the street the marker belongs to.
    #[arg(long = ARG_STREET, value_name = "id")]
    #[serde(default)]
    pub(crate) street: Option<String>,
    /// Marker longitude in degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Marker latitude in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
}

impl SuggestArgs {
    pub(crate) fn into_config(self) -> Result<SuggestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SuggestConfig::try_from(merged)
    }
}

/// Resolved `suggest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SuggestConfig {
    /// Base URL of the address database API.
    pub(crate) base_url: String,
    /// Scope whose streets are loaded.
    pub(crate) scope: SessionScope,
    /// Street the marker belongs to.
    pub(crate) street: EntityId,
    /// Marker position (longitude, latitude).
    pub(crate) marker: Coord<f64>,
}

impl TryFrom<SuggestArgs> for SuggestConfig {
    type Error = CliError;

    fn try_from(args: SuggestArgs) -> Result<Self, Self::Error> {
        let base_locale = args.base_locale.ok_or(CliError::MissingArgument {
            field: ARG_BASE_LOCALE,
            env: ENV_BASE_LOCALE,
        })?;
        let commune = args.commune.ok_or(CliError::MissingArgument {
            field: ARG_COMMUNE,
            env: ENV_COMMUNE,
        })?;
        let street = args.street.ok_or(CliError::MissingArgument {
            field: ARG_STREET,
            env: ENV_STREET,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_LON,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_LAT,
        })?;
        require_in_range(ARG_LON, lon, 180.0)?;
        require_in_range(ARG_LAT, lat, 90.0)?;

        let base_url = args
            .base_url
            .unwrap_or_else(|| HttpDataAccessConfig::default().base_url);

        Ok(Self {
            base_url,
            scope: SessionScope::new(base_locale, commune),
            street: EntityId::new(street),
            marker: Coord { x: lon, y: lat },
        })
    }
}

fn require_in_range(field: &'static str, value: f64, limit: f64) -> Result<(), CliError> {
    if value.is_finite() && value.abs() <= limit {
        Ok(())
    } else {
        Err(CliError::CoordinateOutOfRange {
            field,
            value,
            limit,
        })
    }
}

/// Builds the data access used by a suggest invocation.
pub(super) trait SuggestAccessBuilder {
    type Access: DataAccess;

    fn build(&self, config: &SuggestConfig) -> Result<Self::Access, CliError>;
}

pub(super) struct HttpAccessBuilder;

impl SuggestAccessBuilder for HttpAccessBuilder {
    type Access = HttpDataAccess;

    fn build(&self, config: &SuggestConfig) -> Result<Self::Access, CliError> {
        HttpDataAccess::new(config.base_url.clone()).map_err(|source| {
            CliError::BuildDataAccess {
                base_url: config.base_url.clone(),
                source,
            }
        })
    }
}

/// Printed result of a suggest invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SuggestOutput {
    pub(crate) street: String,
    pub(crate) name: String,
    pub(crate) numero: Option<String>,
}

pub(super) fn run_suggest(args: SuggestArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_suggest_with(args, &HttpAccessBuilder, &mut stdout)
}

pub(super) fn run_suggest_with<B: SuggestAccessBuilder>(
    args: SuggestArgs,
    builder: &B,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let output = execute_suggest(&config, builder)?;
    write_suggestion(writer, &output)
}

pub(super) fn execute_suggest<B: SuggestAccessBuilder>(
    config: &SuggestConfig,
    builder: &B,
) -> Result<SuggestOutput, CliError> {
    let access = builder.build(config)?;
    let store = EntityStore::new(access, config.scope.clone());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime
        .block_on(store.reload(CollectionKind::Streets))
        .map_err(CliError::FetchStreets)?;

    let streets = store.streets();
    let street = streets
        .get(&config.street)
        .ok_or_else(|| CliError::UnknownStreet {
            id: config.street.to_string(),
            commune: config.scope.commune.clone(),
        })?;
    let mut engine = MarkerSuggestionEngine::new();
    engine.set_street(street);
    let numero = engine.move_marker(config.marker).map(str::to_owned);

    Ok(SuggestOutput {
        street: street.id.to_string(),
        name: street.name.clone(),
        numero,
    })
}

fn write_suggestion(writer: &mut dyn Write, output: &SuggestOutput) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(output).map_err(CliError::SerializeSuggestion)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SuggestConfig, CliError> {
    let merged = SuggestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SuggestConfig::try_from(merged)
}
