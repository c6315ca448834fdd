//! Geographic coordinates and great-circle distance helpers.
//!
//! Distances use the Haversine formula on a sphere of radius
//! [`EARTH_RADIUS_KM`]. Conversions to `geo` types follow the
//! `x = longitude`, `y = latitude` convention.

use geo::{Coord, Point, Rect};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for every distance computation, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack added to bounding boxes so float rounding never drops a point that
/// sits exactly on the radius.
const BOUNDING_BOX_SLACK_DEG: f64 = 1e-9;

/// A latitude/longitude pair in signed decimal degrees.
///
/// # Examples
/// ```
/// use parkspot_core::Coordinates;
///
/// let origin = Coordinates::new(14.0723, -87.1921);
/// assert_eq!(origin.latitude, 14.0723);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Construct a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        distance_km(*self, *other)
    }

    /// Return a lon/lat rectangle containing every point within `radius_km`.
    ///
    /// Returns `None` when the box would reach a pole or cross the
    /// antimeridian; callers must then fall back to exact distance checks.
    /// Containment uses `geo::Intersects`, which treats boundary points as
    /// inside.
    ///
    /// # Examples
    /// ```
    /// use geo::Intersects;
    /// use parkspot_core::Coordinates;
    ///
    /// let origin = Coordinates::new(14.0723, -87.1921);
    /// let bbox = origin.bounding_box(2.0).expect("box away from poles");
    /// assert!(bbox.intersects(&geo::Coord::from(Coordinates::new(14.08, -87.19))));
    /// ```
    #[must_use]
    pub fn bounding_box(&self, radius_km: f64) -> Option<Rect<f64>> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return None;
        }
        let angular = radius_km / EARTH_RADIUS_KM;
        let delta_lat = angular.to_degrees() + BOUNDING_BOX_SLACK_DEG;
        let min_lat = self.latitude - delta_lat;
        let max_lat = self.latitude + delta_lat;
        if min_lat <= -90.0 || max_lat >= 90.0 {
            return None;
        }

        let ratio = angular.sin() / self.latitude.to_radians().cos();
        if !(0.0..1.0).contains(&ratio) {
            return None;
        }
        let delta_lon = ratio.asin().to_degrees() + BOUNDING_BOX_SLACK_DEG;
        let min_lon = self.longitude - delta_lon;
        let max_lon = self.longitude + delta_lon;
        if min_lon < -180.0 || max_lon > 180.0 {
            return None;
        }

        Some(Rect::new(
            Coord {
                x: min_lon,
                y: min_lat,
            },
            Coord {
                x: max_lon,
                y: max_lat,
            },
        ))
    }
}

impl From<Coordinates> for Coord<f64> {
    fn from(value: Coordinates) -> Self {
        Self {
            x: value.longitude,
            y: value.latitude,
        }
    }
}

impl From<Coord<f64>> for Coordinates {
    fn from(value: Coord<f64>) -> Self {
        Self::new(value.y, value.x)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(value: Coordinates) -> Self {
        Self(value.into())
    }
}

/// Great-circle distance between `a` and `b` in kilometres.
///
/// The result is symmetric, non-negative and zero for identical points.
///
/// # Examples
/// ```
/// use parkspot_core::{Coordinates, distance_km};
///
/// let a = Coordinates::new(14.0723, -87.1921);
/// let b = Coordinates::new(14.0818, -87.2068);
/// assert_eq!(distance_km(a, b), distance_km(b, a));
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
#[must_use]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let half_dlat = (b.latitude - a.latitude).to_radians() / 2.0;
    let half_dlon = (b.longitude - a.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_dlon.sin().powi(2);
    // Rounding can push `h` a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Render a distance for display.
///
/// Distances under one kilometre are shown in whole metres, anything else in
/// kilometres with one decimal place.
///
/// # Examples
/// ```
/// use parkspot_core::format_distance;
///
/// assert_eq!(format_distance(0.45), "450 m");
/// assert_eq!(format_distance(2.345), "2.3 km");
/// ```
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round())
    } else {
        format!("{km:.1} km")
    }
}
