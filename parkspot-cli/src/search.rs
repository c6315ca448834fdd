//! `search` and `nearby` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use parkspot_core::{Coordinates, SearchEngine, SearchQuery, SeedDataset, SortKey};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_LAT, ARG_LON, ARG_STORE, CliError, block_on, non_negative, open_repository, point,
    resolve_origin, store_or_default, write_json,
};

pub(crate) const ARG_SEARCH_TEXT: &str = "text";
pub(crate) const ARG_SEARCH_MAX_DISTANCE: &str = "max-distance";
pub(crate) const ARG_SEARCH_MIN_SPOTS: &str = "min-spots";
pub(crate) const ARG_SEARCH_MAX_PRICE: &str = "max-price";
pub(crate) const ARG_SEARCH_SORT: &str = "sort";
pub(crate) const ARG_SEARCH_ACTIVE_ONLY: &str = "active-only";
pub(crate) const ARG_NEARBY_RADIUS: &str = "radius";
pub(crate) const ENV_SEARCH_LAT: &str = "PARKSPOT_CMDS_SEARCH_LAT";
pub(crate) const ENV_SEARCH_LON: &str = "PARKSPOT_CMDS_SEARCH_LON";
pub(crate) const ENV_NEARBY_LAT: &str = "PARKSPOT_CMDS_NEARBY_LAT";
pub(crate) const ENV_NEARBY_LON: &str = "PARKSPOT_CMDS_NEARBY_LON";
pub(crate) const ENV_NEARBY_RADIUS: &str = "PARKSPOT_CMDS_NEARBY_RADIUS";

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Filter parking locations by name or address text, free \
                 spots, hourly rate and activity. Supplying --lat and --lon \
                 annotates every result with its distance; --max-distance \
                 then bounds it in kilometres.",
    about = "Search parking locations"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct SearchArgs {
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
    /// Case-insensitive text matched against name and address.
    #[arg(long = ARG_SEARCH_TEXT, value_name = "text")]
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// Latitude of the search origin.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search origin.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Only keep locations within this many kilometres of the origin.
    #[arg(long = ARG_SEARCH_MAX_DISTANCE, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance: Option<f64>,
    /// Minimum number of free spots.
    #[arg(long = ARG_SEARCH_MIN_SPOTS, value_name = "count")]
    #[serde(default)]
    pub(crate) min_spots: Option<u32>,
    /// Maximum hourly rate.
    #[arg(long = ARG_SEARCH_MAX_PRICE, value_name = "rate")]
    #[serde(default)]
    pub(crate) max_price: Option<f64>,
    /// Order results by distance, price, availability or name.
    #[arg(long = ARG_SEARCH_SORT, value_name = "key")]
    #[serde(default)]
    pub(crate) sort: Option<SortKey>,
    /// Skip locations that are not currently operating.
    #[arg(
        long = ARG_SEARCH_ACTIVE_ONLY,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) active_only: Option<bool>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) query: SearchQuery,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let origin = resolve_origin(args.lat, args.lon, (ENV_SEARCH_LAT, ENV_SEARCH_LON))?;
        let mut query = SearchQuery::new();
        if let Some(text) = args.text {
            query = query.with_text(text);
        }
        query = match (origin, args.max_distance) {
            (Some(point), Some(km)) => {
                query.within_km(point, non_negative(ARG_SEARCH_MAX_DISTANCE, km)?)
            }
            (Some(point), None) => query.from_origin(point),
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LAT,
                    env: ENV_SEARCH_LAT,
                });
            }
            (None, None) => query,
        };
        if let Some(spots) = args.min_spots {
            query = query.with_min_available_spots(spots);
        }
        if let Some(price) = args.max_price {
            query = query.with_max_price(non_negative(ARG_SEARCH_MAX_PRICE, price)?);
        }
        if let Some(key) = args.sort {
            query = query.sorted_by(key);
        }
        if args.active_only.unwrap_or(false) {
            query = query.active_only();
        }
        Ok(Self {
            store: store_or_default(args.store),
            query,
        })
    }
}

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "List every parking location within --radius kilometres \
                 of the given point, nearest first.",
    about = "List nearby parking locations"
)]
#[ortho_config(prefix = "PARKSPOT")]
pub(crate) struct NearbyArgs {
    /// Path to the SQLite store.
    #[arg(long = ARG_STORE, value_name = "path")]
    #[serde(default)]
    pub(crate) store: Option<Utf8PathBuf>,
    /// Latitude of the centre point.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the centre point.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Search radius in kilometres.
    #[arg(long = ARG_NEARBY_RADIUS, value_name = "km")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

/// Resolved `nearby` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) store: Utf8PathBuf,
    pub(crate) origin: Coordinates,
    pub(crate) radius_km: f64,
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_NEARBY_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_NEARBY_LON,
        })?;
        let radius = args.radius.ok_or(CliError::MissingArgument {
            field: ARG_NEARBY_RADIUS,
            env: ENV_NEARBY_RADIUS,
        })?;
        Ok(Self {
            store: store_or_default(args.store),
            origin: point(lat, lon)?,
            radius_km: non_negative(ARG_NEARBY_RADIUS, radius)?,
        })
    }
}

pub(crate) fn run_search_with(
    config: &SearchConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let repository = open_repository(&config.store, SeedDataset::default())?;
    let matches = block_on(async {
        repository.initialize().await;
        SearchEngine::new(&repository)
            .search_locations(&config.query)
            .await
    })?;
    write_json(writer, &matches)
}

pub(crate) fn run_nearby_with(
    config: &NearbyConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let repository = open_repository(&config.store, SeedDataset::default())?;
    let matches = block_on(async {
        repository.initialize().await;
        SearchEngine::new(&repository)
            .nearby_locations(config.origin, config.radius_km)
            .await
    })?;
    write_json(writer, &matches)
}
