//! `set-spots` command: record a new free-spot count for a location.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkspot_core::{AvailabilityPolicy, AvailabilityUpdater, SeedDataset};
use serde::{Deserialize, Serialize};

use crate::{ARG_STORE, CliError, block_on, open_repository, store_or_default, write_json};

pub(crate) const ARG_SET_SPOTS_LOCATION: &str = "location-id";
pub(crate) const ARG_SET_SPOTS_COUNT: &str = "count";
pub(crate) const ARG_SET_SPOTS_CLAMP: &str = "clamp";
pub(crate) const ENV_SET_SPOTS_LOCATION: &str = "PARKSPOT_CMDS_SET_SPOTS_LOCATION_ID";
pub(crate) const ENV_SET_SPOTS_COUNT: &str = "PARKSPOT_CMDS_SET_SPOTS_COUNT";

/// CLI arguments for the `set-spots` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Set the number of free spots at a location. Counts outside \
                 0..=totalSpots are rejected unless --clamp is given, in \
                 which case they are pulled to the nearest bound.",
    about = "Update free spots at a location"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct SetSpotsArgs {
    /// Identifier of the parking location.
    #[arg(value_name = "location-id")]
    #[serde(default)]
    pub(crate) location_id: Option<String>,
    /// New number of free spots.
    #[arg(value_name = "count", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) count: Option<i64>,
    /// Clamp out-of-range counts instead of rejecting them.
    #[arg(
        long = ARG_SET_SPOTS_CLAMP,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) clamp: Option<bool>,
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
}

impl SetSpotsArgs {
    pub(crate) fn into_config(self) -> Result<SetSpotsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SetSpotsConfig::try_from(merged)
    }
}

/// Resolved `set-spots` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetSpotsConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) location_id: String,
    pub(crate) count: i64,
    pub(crate) policy: AvailabilityPolicy,
}

impl TryFrom<SetSpotsArgs> for SetSpotsConfig {
    type Error = CliError;

    fn try_from(args: SetSpotsArgs) -> Result<Self, Self::Error> {
        let location_id = args.location_id.ok_or(CliError::MissingArgument {
            field: ARG_SET_SPOTS_LOCATION,
            env: ENV_SET_SPOTS_LOCATION,
        })?;
        let count = args.count.ok_or(CliError::MissingArgument {
            field: ARG_SET_SPOTS_COUNT,
            env: ENV_SET_SPOTS_COUNT,
        })?;
        let policy = if args.clamp.unwrap_or(false) {
            AvailabilityPolicy::Clamp
        } else {
            AvailabilityPolicy::Reject
        };
        Ok(Self {
            store: store_or_default(args.store),
            location_id,
            count,
            policy,
        })
    }
}

pub(crate) fn run_set_spots_with(
    config: &SetSpotsConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let repository = open_repository(&config.store, SeedDataset::default())?;
    let updated = block_on(async {
        repository.initialize().await;
        AvailabilityUpdater::new(&repository)
            .with_policy(config.policy)
            .set_available_spots(&config.location_id, config.count)
            .await
    })??;
    write_json(writer, &updated)
}
