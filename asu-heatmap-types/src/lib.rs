//! Geometric primitives used by the heat-map viewer.
//!
//! * [`geo`] contains points in geographic coordinates (latitude and longitude) and the
//!   Web Mercator [`Projection`](geo::Projection) used to place them on the map plane.
//! * [`cartesian`] contains points, rectangles and sizes on the projected plane or on the screen.

pub mod cartesian;
pub mod error;
pub mod geo;
#[cfg(feature = "geojson")]
pub mod geojson;
