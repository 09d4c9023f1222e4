//! Points in geographic coordinates and their projection to the map plane.

mod datum;
mod point;
mod projection;

pub use datum::Datum;
pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
pub use projection::{Projection, WebMercator, MAX_MERCATOR_LAT};
