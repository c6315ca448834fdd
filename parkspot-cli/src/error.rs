//! Error types emitted by the `parkspot` CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use parkspot_core::{AvailabilityError, SeedError};
use parkspot_core::store::SqliteKeyValueStoreError;
use thiserror::Error;

/// Errors emitted by the `parkspot` CLI.
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
    /// A coordinate lies outside the valid latitude or longitude range.
    #[error("{field} {value} is outside [{min}, {max}]")]
    CoordinateOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// A distance or price option is negative or not finite.
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the seed dataset failed.
    #[error("failed to open seed dataset at {path:?}: {source}")]
    OpenSeedFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Seed dataset JSON could not be decoded.
    #[error("failed to parse seed dataset JSON at {path:?}: {source}")]
    ParseSeedFile {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The seed dataset parsed but broke a location or reference rule.
    #[error("seed dataset at {path:?} is invalid: {source}")]
    InvalidSeed {
        path: Utf8PathBuf,
        #[source]
        source: SeedError,
    },
    /// The directory holding the store could not be created.
    #[error("failed to prepare store directory for {path:?}: {source}")]
    PrepareStoreDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite store failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteKeyValueStoreError),
    /// Building the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The requested location is not in the store.
    #[error("no parking location with id {location_id:?}")]
    UnknownLocation { location_id: String },
    /// The availability update was rejected.
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
