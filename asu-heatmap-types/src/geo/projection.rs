use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::datum::Datum;
use super::point::{GeoPoint, GeoPoint2d, NewGeoPoint};
use crate::cartesian::Point2d;

/// Latitude limit of the Web Mercator projection (the world is a square at this latitude).
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Converts points between two coordinate systems.
pub trait Projection {
    /// Source point type.
    type InPoint;
    /// Target point type.
    type OutPoint;

    /// Projects a point. Returns `None` if the point cannot be projected.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Inverse of [`Projection::project`].
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}

/// Spherical Web Mercator projection (EPSG:3857), used by all standard tile servers.
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection on the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Projection for WebMercator {
    type InPoint = GeoPoint2d;
    type OutPoint = Point2d;

    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        if input.lat().abs() > MAX_MERCATOR_LAT {
            return None;
        }

        let r = self.datum.semimajor();
        let x = r * input.lon_rad();
        let y = r * (FRAC_PI_4 + input.lat_rad() / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        let r = self.datum.semimajor();
        let lat = 2.0 * (input.y / r).exp().atan() - FRAC_PI_2;
        let lon = input.x / r;

        if lat.is_finite() && lon.is_finite() {
            Some(GeoPoint2d::latlon(lat.to_degrees(), lon.to_degrees()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn projects_origin_to_zero() {
        let projected = WebMercator::default()
            .project(&GeoPoint2d::latlon(0.0, 0.0))
            .expect("projectable");
        assert_abs_diff_eq!(projected.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn known_values() {
        let projected = WebMercator::default()
            .project(&GeoPoint2d::latlon(-25.70095, -57.83323))
            .expect("projectable");
        assert_abs_diff_eq!(projected.x, -6_437_965.7, epsilon = 0.1);
        assert_abs_diff_eq!(projected.y, -2_962_089.2, epsilon = 0.1);
    }

    #[test]
    fn round_trip() {
        let projection = WebMercator::default();
        let point = GeoPoint2d::latlon(-25.295239, -57.625608);
        let projected = projection.project(&point).expect("projectable");
        let back = projection.unproject(&projected).expect("unprojectable");
        assert_abs_diff_eq!(back, point, epsilon = 1e-9);
    }

    #[test]
    fn poles_are_not_projected() {
        assert!(WebMercator::default()
            .project(&GeoPoint2d::latlon(89.0, 0.0))
            .is_none());
    }
}
