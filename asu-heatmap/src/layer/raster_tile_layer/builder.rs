use super::{RasterTileLayer, TileUrlTemplate, UrlSource};
use crate::bounds::GeographicBounds;
use crate::config::TileSourceConfig;
use crate::error::HeatmapError;
use crate::layer::attribution::Attribution;
use crate::tile_schema::{TileIndex, TileSchema};

const DEFAULT_MAX_ZOOM: u32 = 19;

/// Constructor for a [`RasterTileLayer`].
///
/// ```no_run
/// use asu_heatmap::layer::RasterTileLayerBuilder;
///
/// let layer = RasterTileLayerBuilder::new_rest(|index| {
///     format!("https://tile.openstreetmap.org/{}/{}/{}.png", index.z, index.x, index.y)
/// })
/// .with_zoom_range(0, 19)
/// .with_attribution(
///     "© OpenStreetMap contributors".to_string(),
///     "https://www.openstreetmap.org/copyright".to_string(),
/// )
/// .build()
/// .expect("failed to create layer");
/// ```
pub struct RasterTileLayerBuilder {
    url_source: Box<dyn UrlSource<TileIndex>>,
    min_zoom: u32,
    max_zoom: u32,
    bounds: Option<GeographicBounds>,
    attribution: Option<Attribution>,
}

impl RasterTileLayerBuilder {
    /// Initializes a builder for a layer that requests tiles from the given url source.
    pub fn new_rest(tile_source: impl UrlSource<TileIndex> + 'static) -> Self {
        Self {
            url_source: Box::new(tile_source),
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            bounds: None,
            attribution: None,
        }
    }

    /// Initializes a builder for a layer with standard OpenStreetMap tiles.
    pub fn new_osm() -> Self {
        Self::new_rest(|index: &TileIndex| {
            format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                index.z, index.x, index.y
            )
        })
        .with_attribution(
            "© OpenStreetMap contributors".to_string(),
            "https://www.openstreetmap.org/copyright".to_string(),
        )
    }

    /// Initializes a builder for a layer that expands the URL template for every tile.
    pub fn new_template(template: TileUrlTemplate) -> Self {
        Self::new_rest(move |index: &TileIndex| template.url(index))
    }

    /// Initializes a builder from the tile source configuration. `bounds` are only applied if
    /// the source is restricted to the map bounds.
    pub fn from_config(
        config: &TileSourceConfig,
        bounds: &GeographicBounds,
    ) -> Result<Self, HeatmapError> {
        let template = TileUrlTemplate::new(config.url_template.clone(), config.ext.clone())?
            .with_subdomains(config.subdomains.clone());

        let mut builder = Self::new_template(template)
            .with_zoom_range(config.min_zoom, config.max_zoom)
            .with_attribution_value((&config.attribution).into());
        if config.restrict_to_bounds {
            builder = builder.with_bounds(bounds);
        }

        Ok(builder)
    }

    /// Sets the zoom levels the tile source has tiles for.
    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Tiles outside of the bounds are not requested.
    pub fn with_bounds(mut self, bounds: &GeographicBounds) -> Self {
        self.bounds = Some(*bounds);
        self
    }

    /// Sets the attribution of the layer.
    pub fn with_attribution(self, text: String, url: String) -> Self {
        self.with_attribution_value(Attribution::new(text, Some(url)))
    }

    fn with_attribution_value(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Consumes the builder and constructs the layer.
    pub fn build(self) -> Result<RasterTileLayer, HeatmapError> {
        let Self {
            url_source,
            min_zoom,
            max_zoom,
            bounds,
            attribution,
        } = self;

        if min_zoom > max_zoom {
            return Err(HeatmapError::InvalidConfig(format!(
                "tile layer zoom range [{min_zoom}, {max_zoom}] is empty"
            )));
        }

        let bounds = match bounds {
            Some(bounds) => {
                bounds.validate()?;
                Some(bounds.projected().ok_or_else(|| {
                    HeatmapError::InvalidBounds("bounds cannot be projected".into())
                })?)
            }
            None => None,
        };

        let tile_schema = TileSchema::web(max_zoom + 1);

        Ok(RasterTileLayer {
            url_source,
            tile_schema,
            min_zoom,
            max_zoom,
            bounds,
            attribution,
        })
    }
}
