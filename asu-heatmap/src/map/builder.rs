use asu_heatmap_types::geo::GeoPoint2d;

use super::Map;
use crate::bounds::{GeographicBounds, MaxBounds};
use crate::config::MapConfig;
use crate::error::HeatmapError;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::view::{zoom_to_resolution, MapView};

const DEFAULT_ZOOM: f64 = 4.0;

/// Constructor of a [`Map`].
///
/// ```no_run
/// use asu_heatmap::layer::RasterTileLayerBuilder;
/// use asu_heatmap::MapBuilder;
/// use asu_heatmap_types::latlon;
///
/// let map = MapBuilder::default()
///     .with_position(latlon!(-25.295239, -57.625608))
///     .with_zoom(14.0)
///     .with_zoom_range(11.5, 19.0)
///     .with_layer(RasterTileLayerBuilder::new_osm().build().expect("valid layer"))
///     .build();
/// ```
#[derive(Default)]
pub struct MapBuilder {
    position: Option<GeoPoint2d>,
    zoom: Option<f64>,
    zoom_range: Option<(f64, f64)>,
    bounds: Option<(GeographicBounds, f64)>,
    layers: Vec<Box<dyn Layer>>,
    messenger: Option<Box<dyn Messenger>>,
}

impl MapBuilder {
    /// Creates a builder with the viewport configuration: initial framing, zoom limits and
    /// bounds.
    pub fn from_config(config: &MapConfig) -> Result<Self, HeatmapError> {
        config.bounds.validate()?;
        if config.min_zoom > config.max_zoom {
            return Err(HeatmapError::InvalidConfig(format!(
                "zoom range [{}, {}] is empty",
                config.min_zoom, config.max_zoom
            )));
        }

        Ok(Self::default()
            .with_position(config.bounds.center())
            .with_zoom(config.initial_zoom)
            .with_zoom_range(config.min_zoom, config.max_zoom)
            .with_bounds(config.bounds, config.bounds_viscosity))
    }

    /// Sets the initial center of the map.
    pub fn with_position(mut self, position: GeoPoint2d) -> Self {
        self.position = Some(position);
        self
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Sets the zoom limits.
    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.zoom_range = Some((min_zoom, max_zoom));
        self
    }

    /// Keeps the view inside the bounds.
    pub fn with_bounds(mut self, bounds: GeographicBounds, viscosity: f64) -> Self {
        self.bounds = Some((bounds, viscosity));
        self
    }

    /// Adds a layer on top of the previously added ones.
    pub fn with_layer(mut self, layer: impl Layer + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Sets the messenger notified about view changes.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Box::new(messenger));
        self
    }

    /// Consumes the builder and creates the map.
    pub fn build(self) -> Map {
        let MapBuilder {
            position,
            zoom,
            zoom_range,
            bounds,
            layers,
            messenger,
        } = self;

        let resolution = zoom_to_resolution(zoom.unwrap_or(DEFAULT_ZOOM));
        let view = MapView::new(&position.unwrap_or_default(), resolution);

        let mut map = Map::new(view, layers, messenger);
        if let Some((min_zoom, max_zoom)) = zoom_range {
            map.set_zoom_range(min_zoom, max_zoom);
        }
        if let Some((bounds, viscosity)) = bounds {
            let max_bounds = MaxBounds::from_geographic(&bounds, viscosity);
            if max_bounds.is_none() {
                log::warn!("Map bounds {bounds:?} cannot be projected and are ignored");
            }
            map.set_max_bounds(max_bounds);
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use asu_heatmap_types::geo::GeoPoint;
    use asu_heatmap_types::latlon;

    use super::*;
    use crate::layer::tests::TestLayer;

    #[test]
    fn constructs_map_with_default_parameters() {
        let map = MapBuilder::default().build();

        let center = map.center().unwrap();
        assert_relative_eq!(center.lat(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(center.lon(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(map.zoom(), DEFAULT_ZOOM);
        assert!(map.layers().is_empty());
        assert!(map.max_bounds().is_none());
    }

    #[test]
    fn from_config_applies_limits() {
        let map = MapBuilder::from_config(&MapConfig::default())
            .unwrap()
            .build();

        assert_relative_eq!(map.zoom(), 14.0, epsilon = 1e-9);
        assert_eq!(map.min_zoom(), 11.5);
        assert_eq!(map.max_zoom(), 19.0);
        assert_eq!(map.max_bounds().unwrap().viscosity(), 1.0);
    }

    #[test]
    fn with_position_sets_position() {
        let map = MapBuilder::default()
            .with_position(latlon!(10.0, 20.0))
            .build();
        assert_relative_eq!(map.center().unwrap().lat(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(map.center().unwrap().lon(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn with_layer_keeps_order() {
        let map = MapBuilder::default()
            .with_layer(TestLayer("a"))
            .with_layer(TestLayer("b"))
            .build();
        let layers: Vec<_> = map
            .layers()
            .iter()
            .filter_map(|l| l.as_any().downcast_ref::<TestLayer>())
            .collect();
        assert_eq!(layers, vec![&TestLayer("a"), &TestLayer("b")]);
    }

    #[test]
    fn invalid_bounds_fail() {
        let mut config = MapConfig::default();
        config.bounds = serde_json::from_str(
            r#"{
                "lower_left": { "lat": 1.0, "lon": 1.0 },
                "upper_right": { "lat": 0.0, "lon": 0.0 },
                "center": { "lat": 0.5, "lon": 0.5 }
            }"#,
        )
        .unwrap();
        assert!(MapBuilder::from_config(&config).is_err());
    }
}
