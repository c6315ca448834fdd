//! `status` and `packages` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkspot_core::{SearchEngine, SeedDataset};
use serde::{Deserialize, Serialize};

use crate::{ARG_STORE, CliError, block_on, open_repository, store_or_default, write_json};

pub(crate) const ARG_PACKAGES_LOCATION: &str = "location-id";
pub(crate) const ENV_PACKAGES_LOCATION: &str = "PARKSPOT_CMDS_PACKAGES_LOCATION_ID";

/// CLI arguments for the `status` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report the number of locations together with total, free \
                 and occupied spots across the whole store.",
    about = "Summarise spot availability"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct StatusArgs {
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
}

impl StatusArgs {
    pub(crate) fn into_config(self) -> Result<StatusConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(StatusConfig::from(merged))
    }
}

/// Resolved `status` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusConfig {
    pub(crate) store: Utf8PathBuf,
}

impl From<StatusArgs> for StatusConfig {
    fn from(args: StatusArgs) -> Self {
        Self {
            store: store_or_default(args.store),
        }
    }
}

/// CLI arguments for the `packages` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List the prepaid time packages offered at a parking \
                 location. Unknown location ids are reported as errors.",
    about = "List packages for a location"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct PackagesArgs {
    /// Identifier of the parking location.
    #[arg(value_name = "location-id")]
    #[serde(default)]
    pub(crate) location_id: Option<String>,
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
}

impl PackagesArgs {
    pub(crate) fn into_config(self) -> Result<PackagesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PackagesConfig::try_from(merged)
    }
}

/// Resolved `packages` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackagesConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) location_id: String,
}

impl TryFrom<PackagesArgs> for PackagesConfig {
    type Error = CliError;

    fn try_from(args: PackagesArgs) -> Result<Self, Self::Error> {
        let location_id = args
            .location_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_PACKAGES_LOCATION,
                env: ENV_PACKAGES_LOCATION,
            })?;
        Ok(Self {
            store: store_or_default(args.store),
            location_id,
        })
    }
}

pub(crate) fn run_status_with(
    config: &StatusConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let repository = open_repository(&config.store, SeedDataset::default())?;
    let status = block_on(async {
        repository.initialize().await;
        SearchEngine::new(&repository).availability_status().await
    })?;
    write_json(writer, &status)
}

pub(crate) fn run_packages_with(
    config: &PackagesConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let repository = open_repository(&config.store, SeedDataset::default())?;
    let packages = block_on(async {
        repository.initialize().await;
        match repository.get_location_by_id(&config.location_id).await {
            Some(location) => Some(repository.get_packages_by_location(&location.id).await),
            None => None,
        }
    })?
    .ok_or_else(|| CliError::UnknownLocation {
        location_id: config.location_id.clone(),
    })?;
    write_json(writer, &packages)
}
