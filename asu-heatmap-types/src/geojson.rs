//! Conversion of GeoJSON geometries into [`GeoPoint2d`].

use geojson::Value;

use crate::error::TypesError;
use crate::geo::{GeoPoint2d, NewGeoPoint};

/// Converts a GeoJSON position (`[lon, lat, ...]`) into a geo point.
pub fn position_to_point(position: &[f64]) -> Result<GeoPoint2d, TypesError> {
    if position.len() < 2 {
        return Err(TypesError::Conversion(
            "point must contain at least 2 dimensions".to_string(),
        ));
    }

    let point = GeoPoint2d::lonlat(position[0], position[1]);
    if !point.is_valid() {
        return Err(TypesError::Conversion(format!(
            "coordinates out of range: {position:?}"
        )));
    }

    Ok(point)
}

impl TryFrom<&Value> for GeoPoint2d {
    type Error = TypesError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Point(position) => position_to_point(position),
            other => Err(TypesError::Conversion(format!(
                "expected a point geometry, got {}",
                geometry_kind(other)
            ))),
        }
    }
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
