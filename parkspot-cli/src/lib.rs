//! Command-line interface for inspecting and updating a parking store.
#![forbid(unsafe_code)]

use std::future::Future;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use parkspot_core::store::{KeyValueLocationStore, SqliteKeyValueStore};
use parkspot_core::{Coordinates, LocationRepository, SeedDataset};
use serde::Serialize;

mod error;
mod init;
mod inventory;
mod search;
mod spots;

pub use error::CliError;

use init::InitArgs;
use inventory::{PackagesArgs, StatusArgs};
use search::{NearbyArgs, SearchArgs};
use spots::SetSpotsArgs;

pub(crate) const ARG_STORE: &str = "store";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const DEFAULT_STORE: &str = "parkspot.db";

/// Repository backed by the SQLite key-value store.
pub(crate) type SqliteRepository = LocationRepository<KeyValueLocationStore<SqliteKeyValueStore>>;

/// Run the `parkspot` CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_with(cli.command, &mut handle)
}

fn run_with(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Init(args) => init::run_init_with(&args.into_config()?, writer),
        Command::Search(args) => search::run_search_with(&args.into_config()?, writer),
        Command::Nearby(args) => search::run_nearby_with(&args.into_config()?, writer),
        Command::Status(args) => inventory::run_status_with(&args.into_config()?, writer),
        Command::Packages(args) => inventory::run_packages_with(&args.into_config()?, writer),
        Command::SetSpots(args) => spots::run_set_spots_with(&args.into_config()?, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "parkspot",
    about = "Discover parking locations and manage their availability",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the store with the bundled or a custom dataset.
    Init(InitArgs),
    /// Search locations by text, distance, free spots and price.
    Search(SearchArgs),
    /// List locations within a radius, nearest first.
    Nearby(NearbyArgs),
    /// Summarise spot availability across every location.
    Status(StatusArgs),
    /// List the packages sold at a location.
    Packages(PackagesArgs),
    /// Set the number of free spots at a location.
    SetSpots(SetSpotsArgs),
}

/// Open the SQLite store at `path`, creating its parent directory if needed.
pub(crate) fn open_repository(
    path: &Utf8Path,
    seed: SeedDataset,
) -> Result<SqliteRepository, CliError> {
    parkspot_fs::ensure_parent_dir(path).map_err(|source| CliError::PrepareStoreDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let backend = SqliteKeyValueStore::open(path.as_std_path())?;
    Ok(LocationRepository::with_seed(
        KeyValueLocationStore::new(backend),
        seed,
    ))
}

/// Drive `future` to completion on a single-threaded runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(CliError::Runtime)?;
    Ok(runtime.block_on(future))
}

/// Write `value` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writeln!(writer, "{rendered}").map_err(CliError::WriteOutput)
}

pub(crate) fn store_or_default(store: Option<Utf8PathBuf>) -> Utf8PathBuf {
    store.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STORE))
}

/// Combine optional latitude and longitude options into a validated point.
///
/// Both must be present or both absent; `envs` names the variables reported
/// when only one was supplied.
pub(crate) fn resolve_origin(
    lat: Option<f64>,
    lon: Option<f64>,
    envs: (&'static str, &'static str),
) -> Result<Option<Coordinates>, CliError> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::MissingArgument {
            field: ARG_LON,
            env: envs.1,
        }),
        (None, Some(_)) => Err(CliError::MissingArgument {
            field: ARG_LAT,
            env: envs.0,
        }),
        (Some(lat), Some(lon)) => point(lat, lon).map(Some),
    }
}

/// Validate a latitude/longitude pair.
pub(crate) fn point(lat: f64, lon: f64) -> Result<Coordinates, CliError> {
    Ok(Coordinates::new(
        within(ARG_LAT, lat, 90.0)?,
        within(ARG_LON, lon, 180.0)?,
    ))
}

fn within(field: &'static str, value: f64, limit: f64) -> Result<f64, CliError> {
    if (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(CliError::CoordinateOutOfRange {
            field,
            value,
            min: -limit,
            max: limit,
        })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, CliError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CliError::InvalidAmount { field, value })
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match parkspot_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
