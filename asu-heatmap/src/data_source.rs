//! Point features the annotation layer is built from.

use asu_heatmap_types::geo::GeoPoint2d;
use async_trait::async_trait;
use geojson::GeoJson;
use maybe_sync::{MaybeSend, MaybeSync};
use serde_json::Value as JsonValue;

use crate::error::FetchError;
use crate::platform;

const NAME_PROPERTY: &str = "Name";

/// Identifier of a feature: its index in the loaded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(usize);

impl FeatureId {
    /// Creates an identifier from the index of the feature.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Index of the feature in the collection it was loaded from.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Named point on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: FeatureId,
    name: Option<String>,
    position: GeoPoint2d,
}

impl Feature {
    /// Creates a new feature.
    pub fn new(id: FeatureId, name: Option<String>, position: GeoPoint2d) -> Self {
        Self { id, name, position }
    }

    /// Identifier of the feature.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Name of the feature as given by the source.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name to show to the user: `placeholder` if the feature has no name or it is empty.
    pub fn display_name<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => placeholder,
        }
    }

    /// Coordinate of the feature.
    pub fn position(&self) -> GeoPoint2d {
        self.position
    }
}

/// Source of the point features.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FeatureSource: MaybeSend + MaybeSync {
    /// Loads the whole collection. Features that cannot be shown as points are skipped.
    async fn load(&self) -> Result<Vec<Feature>, FetchError>;
}

/// Loads a GeoJSON feature collection with a single HTTP GET request.
#[derive(Debug, Clone)]
pub struct UrlFeatureSource {
    url: String,
}

impl UrlFeatureSource {
    /// Creates a source for the given url.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Location of the collection.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FeatureSource for UrlFeatureSource {
    async fn load(&self) -> Result<Vec<Feature>, FetchError> {
        log::debug!("Loading features from {}", self.url);
        let text = platform::instance().load_text_from_url(&self.url).await?;
        let features = parse_feature_collection(&text)?;
        log::info!("Loaded {} features from {}", features.len(), self.url);

        Ok(features)
    }
}

/// Feature source with a fixed result. Useful for embedding data and for tests.
#[derive(Debug, Clone)]
pub struct StaticFeatureSource {
    result: Result<Vec<Feature>, FetchError>,
}

impl StaticFeatureSource {
    /// Source that always returns the given features.
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            result: Ok(features),
        }
    }

    /// Source that always fails with the given error.
    pub fn failing(error: FetchError) -> Self {
        Self { result: Err(error) }
    }

    /// Source that parses the given GeoJSON text on every load.
    pub fn from_geojson(text: &str) -> Self {
        Self {
            result: parse_feature_collection(text),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FeatureSource for StaticFeatureSource {
    async fn load(&self) -> Result<Vec<Feature>, FetchError> {
        self.result.clone()
    }
}

/// Parses a GeoJSON document into point features.
///
/// A feature collection and a single feature are accepted. Features without a point geometry
/// are skipped with a warning. The name of a feature is taken from its `Name` property.
pub fn parse_feature_collection(text: &str) -> Result<Vec<Feature>, FetchError> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|err: geojson::Error| FetchError::Parse(err.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(FetchError::Parse(
                "expected a feature collection, got a bare geometry".into(),
            ))
        }
    };

    let mut parsed = Vec::with_capacity(features.len());
    for (index, feature) in features.into_iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            log::warn!("Feature #{index} has no geometry, skipping it");
            continue;
        };

        let position = match GeoPoint2d::try_from(&geometry.value) {
            Ok(position) => position,
            Err(err) => {
                log::warn!("Feature #{index} is not a point, skipping it: {err}");
                continue;
            }
        };

        let name = feature
            .properties
            .as_ref()
            .and_then(|properties| properties.get(NAME_PROPERTY))
            .and_then(property_to_string);

        parsed.push(Feature::new(FeatureId::new(index), name, position));
    }

    Ok(parsed)
}

fn property_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(v) => Some(v.clone()),
        JsonValue::Number(v) => Some(v.to_string()),
        JsonValue::Bool(v) => Some(v.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use asu_heatmap_types::geo::GeoPoint;
    use assert_matches::assert_matches;

    use super::*;

    const SCHOOLS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "Name": "Escuela Básica N° 1" },
                "geometry": { "type": "Point", "coordinates": [-57.63, -25.28] }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [-57.60, -25.30, 120.0] }
            },
            {
                "type": "Feature",
                "properties": { "Name": "Plaza" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-57.6, -25.3], [-57.5, -25.3], [-57.5, -25.2], [-57.6, -25.3]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "Name": 12 },
                "geometry": null
            },
            {
                "type": "Feature",
                "properties": { "Name": 12 },
                "geometry": { "type": "Point", "coordinates": [-57.58, -25.31] }
            }
        ]
    }"#;

    #[test]
    fn parses_points_and_skips_the_rest() {
        let features = parse_feature_collection(SCHOOLS).unwrap();
        assert_eq!(features.len(), 3);

        assert_eq!(features[0].id(), FeatureId::new(0));
        assert_eq!(features[0].name(), Some("Escuela Básica N° 1"));
        assert_eq!(features[0].position().lat(), -25.28);
        assert_eq!(features[0].position().lon(), -57.63);

        assert_eq!(features[1].id(), FeatureId::new(1));
        assert_eq!(features[1].name(), None);

        assert_eq!(features[2].id(), FeatureId::new(4));
        assert_eq!(features[2].name(), Some("12"));
    }

    #[test]
    fn missing_or_empty_name_uses_placeholder() {
        let features = parse_feature_collection(SCHOOLS).unwrap();
        assert_eq!(features[1].display_name("Sin nombre"), "Sin nombre");

        let empty = Feature::new(FeatureId::new(0), Some(String::new()), GeoPoint2d::default());
        assert_eq!(empty.display_name("Sin nombre"), "Sin nombre");
        assert_eq!(features[0].display_name("Sin nombre"), "Escuela Básica N° 1");
    }

    #[test]
    fn malformed_payload_is_parse_error() {
        assert_matches!(parse_feature_collection("<html>"), Err(FetchError::Parse(_)));
        assert_matches!(
            parse_feature_collection(r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#),
            Err(FetchError::Parse(_))
        );
    }

    #[test]
    fn empty_collection() {
        let features =
            parse_feature_collection(r#"{ "type": "FeatureCollection", "features": [] }"#)
                .unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn static_source_returns_result() {
        let source = StaticFeatureSource::from_geojson(SCHOOLS);
        let features = tokio_test::block_on(source.load()).unwrap();
        assert_eq!(features.len(), 3);

        let source = StaticFeatureSource::failing(FetchError::Status(404));
        assert_eq!(
            tokio_test::block_on(source.load()),
            Err(FetchError::Status(404))
        );
    }
}
