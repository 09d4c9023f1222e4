use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

/// Point given by latitude and longitude in degrees.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn lat(&self) -> f64;
    /// Longitude in degrees.
    fn lon(&self) -> f64;

    /// Latitude in radians.
    fn lat_rad(&self) -> f64 {
        self.lat().to_radians()
    }

    /// Longitude in radians.
    fn lon_rad(&self) -> f64 {
        self.lon().to_radians()
    }
}

/// Geo point that can be constructed from coordinates.
pub trait NewGeoPoint: GeoPoint + Sized {
    /// Creates a point from latitude and longitude.
    fn latlon(lat: f64, lon: f64) -> Self;

    /// Creates a point from longitude and latitude (GeoJSON axis order).
    fn lonlat(lon: f64, lat: f64) -> Self {
        Self::latlon(lat, lon)
    }
}

/// 2d point on the surface of the Earth.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl GeoPoint2d {
    /// Copies coordinates of any other geo point.
    pub fn from(other: &impl GeoPoint) -> Self {
        Self {
            lat: other.lat(),
            lon: other.lon(),
        }
    }

    /// Returns true if both coordinates are finite numbers in the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl AbsDiffEq for GeoPoint2d {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.lat.abs_diff_eq(&other.lat, epsilon) && self.lon.abs_diff_eq(&other.lon, epsilon)
    }
}

impl RelativeEq for GeoPoint2d {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.lat.relative_eq(&other.lat, epsilon, max_relative)
            && self.lon.relative_eq(&other.lon, epsilon, max_relative)
    }
}

/// Creates a new [`GeoPoint2d`] from latitude and longitude values (in degrees).
///
/// ```
/// use asu_heatmap_types::geo::GeoPoint;
/// use asu_heatmap_types::latlon;
///
/// let point = latlon!(-25.29, -57.62);
/// assert_eq!(point.lat(), -25.29);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <::asu_heatmap_types::geo::GeoPoint2d as ::asu_heatmap_types::geo::NewGeoPoint>::latlon(
            $lat, $lon,
        )
    };
}
