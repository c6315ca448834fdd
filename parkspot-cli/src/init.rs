//! `init` command: seed a store with the bundled or a custom dataset.

use std::io::{BufReader, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkspot_core::SeedDataset;
use parkspot_fs::open_utf8_file;
use serde::{Deserialize, Serialize};

use crate::{
    ARG_STORE, CliError, block_on, open_repository, require_existing, store_or_default,
    write_json,
};

pub(crate) const ARG_INIT_FORCE: &str = "force";
pub(crate) const ARG_INIT_SEED_FILE: &str = "seed-file";

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Seed the store if it holds no parking locations yet. \
                 With --force, every collection is replaced by the seed \
                 dataset. A custom dataset is a JSON object with locations, \
                 packages and userPackages arrays.",
    about = "Seed the parking store"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct InitArgs {
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
    /// Replace existing data even if the store is already seeded.
    #[arg(
        long = ARG_INIT_FORCE,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) force: Option<bool>,
    /// JSON dataset to seed from instead of the bundled one.
    #[arg(long = ARG_INIT_SEED_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) seed_file: Option<Utf8PathBuf>,
}

impl InitArgs {
    pub(crate) fn into_config(self) -> Result<InitConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        InitConfig::try_from(merged)
    }
}

/// Resolved `init` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) force: bool,
    pub(crate) seed_file: Option<Utf8PathBuf>,
}

impl InitConfig {
    fn load_seed(&self) -> Result<SeedDataset, CliError> {
        let Some(path) = &self.seed_file else {
            return Ok(SeedDataset::default());
        };
        require_existing(path, ARG_INIT_SEED_FILE)?;
        let file = open_utf8_file(path).map_err(|source| CliError::OpenSeedFile {
            path: path.clone(),
            source,
        })?;
        let dataset: SeedDataset =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                CliError::ParseSeedFile {
                    path: path.clone(),
                    source,
                }
            })?;
        dataset
            .validate()
            .map_err(|source| CliError::InvalidSeed {
                path: path.clone(),
                source,
            })?;
        Ok(dataset)
    }
}

impl TryFrom<InitArgs> for InitConfig {
    type Error = CliError;

    fn try_from(args: InitArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            store: store_or_default(args.store),
            force: args.force.unwrap_or(false),
            seed_file: args.seed_file,
        })
    }
}

/// Summary printed once the store is seeded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InitReport {
    pub(crate) store: Utf8PathBuf,
    pub(crate) forced: bool,
    pub(crate) locations: usize,
    pub(crate) packages: usize,
}

pub(crate) fn run_init_with(config: &InitConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let seed = config.load_seed()?;
    let repository = open_repository(&config.store, seed)?;
    let report = block_on(async {
        if config.force {
            repository.force_reseed().await;
        } else {
            repository.initialize().await;
        }
        InitReport {
            store: config.store.clone(),
            forced: config.force,
            locations: repository.get_all_locations().await.len(),
            packages: repository.get_all_packages().await.len(),
        }
    })?;
    write_json(writer, &report)
}
