//! Layer of prerendered raster tiles.

use std::any::Any;

use asu_heatmap_types::cartesian::Rect;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::layer::attribution::Attribution;
use crate::layer::Layer;
use crate::render::Canvas;
use crate::tile_schema::{TileIndex, TileSchema};
use crate::view::MapView;

mod builder;
mod url_template;

pub use builder::RasterTileLayerBuilder;
pub use url_template::TileUrlTemplate;

/// Function that returns the URL of a resource by its key.
pub trait UrlSource<Key: ?Sized>: (Fn(&Key) -> String) + MaybeSend + MaybeSync {}
impl<Key: ?Sized, T: Fn(&Key) -> String> UrlSource<Key> for T where T: MaybeSend + MaybeSync {}

/// Raster tile layers load prerendered tile sets using [`UrlSource`] and render them to the map.
///
/// Tiles are requested for the z-level closest to the map resolution, limited to the zoom range
/// the source provides. Above the maximum zoom the tiles of the maximum level are stretched,
/// below the minimum zoom the layer draws nothing.
pub struct RasterTileLayer {
    url_source: Box<dyn UrlSource<TileIndex>>,
    tile_schema: TileSchema,
    min_zoom: u32,
    max_zoom: u32,
    bounds: Option<Rect>,
    attribution: Option<Attribution>,
}

impl std::fmt::Debug for RasterTileLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterTileLayer")
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("bounds", &self.bounds)
            .field("attribution", &self.attribution)
            .finish()
    }
}

impl RasterTileLayer {
    /// Tile schema of the layer.
    pub fn tile_schema(&self) -> &TileSchema {
        &self.tile_schema
    }

    /// Zoom levels the layer requests tiles for.
    pub fn zoom_range(&self) -> (u32, u32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Projected rectangle outside of which no tiles are requested.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// URL of the tile.
    pub fn tile_url(&self, index: &TileIndex) -> String {
        (self.url_source)(index)
    }

    /// Z-level the tiles are requested for at the given view. `None` if the view is zoomed out
    /// beyond the minimum zoom of the layer.
    pub fn tile_z(&self, view: &MapView) -> Option<u32> {
        let z = self.tile_schema.select_lod(view.resolution())?.z_index();
        if z < self.min_zoom {
            return None;
        }

        Some(z.min(self.max_zoom))
    }

    /// Indices of the tiles covering the visible part of the map.
    pub fn visible_tiles(&self, view: &MapView) -> Vec<TileIndex> {
        let Some(z) = self.tile_z(view) else {
            return vec![];
        };
        let Some(mut bbox) = view.get_bbox() else {
            return vec![];
        };

        if let Some(bounds) = &self.bounds {
            match bbox.limit(bounds) {
                Some(limited) => bbox = limited,
                None => return vec![],
            }
        }

        self.tile_schema
            .iter_tiles_over_bbox(z, bbox)
            .map(|tiles| tiles.collect())
            .unwrap_or_default()
    }
}

impl Layer for RasterTileLayer {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        for index in self.visible_tiles(view) {
            let Some(tile_bbox) = self.tile_schema.tile_bbox(index) else {
                continue;
            };

            let url = self.tile_url(&index);
            canvas.draw_image(&url, view.rect_to_screen(&tile_bbox), 1.0);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use asu_heatmap_types::cartesian::{Point2d, Size};
    use asu_heatmap_types::latlon;

    use super::*;
    use crate::bounds::GeographicBounds;
    use crate::render::tests::RecordingCanvas;

    fn asuncion_view(zoom: f64) -> MapView {
        MapView::new(&GeographicBounds::asuncion().center(), 1.0)
            .with_zoom(zoom)
            .with_size(Size::new(800.0, 600.0))
    }

    #[test]
    fn renders_tiles_of_closest_level() {
        let layer = RasterTileLayerBuilder::new_osm().build().unwrap();
        let view = asuncion_view(14.0);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        layer.render(&view, &mut canvas);

        let images = canvas.images();
        assert!(!images.is_empty());
        for (url, rect, opacity) in images {
            assert!(url.starts_with("https://tile.openstreetmap.org/14/"));
            assert_relative_eq!(rect.width(), 256.0, epsilon = 1e-6);
            assert_eq!(opacity, 1.0);
        }
    }

    #[test]
    fn tiles_cover_the_screen() {
        let layer = RasterTileLayerBuilder::new_osm().build().unwrap();
        let view = asuncion_view(14.0);
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        layer.render(&view, &mut canvas);

        let corners: Vec<Point2d> = canvas
            .images()
            .iter()
            .flat_map(|(_, rect, _)| {
                [
                    Point2d::new(rect.x_min(), rect.y_min()),
                    Point2d::new(rect.x_max(), rect.y_max()),
                ]
            })
            .collect();
        let covered = Rect::from_points(corners.iter()).unwrap();
        assert!(covered.contains_rect(&Rect::new(0.0, 0.0, 800.0, 600.0)));
    }

    #[test]
    fn overzoomed_tiles_use_max_level() {
        let layer = RasterTileLayerBuilder::new_osm()
            .with_zoom_range(0, 16)
            .build()
            .unwrap();
        assert_eq!(layer.tile_z(&asuncion_view(18.0)), Some(16));
    }

    #[test]
    fn no_tiles_below_min_zoom() {
        let layer = RasterTileLayerBuilder::new_osm()
            .with_zoom_range(15, 19)
            .build()
            .unwrap();
        assert!(layer.visible_tiles(&asuncion_view(12.0)).is_empty());
    }

    #[test]
    fn bounds_restrict_tiles() {
        let unrestricted = RasterTileLayerBuilder::new_osm().build().unwrap();
        let restricted = RasterTileLayerBuilder::new_osm()
            .with_bounds(&GeographicBounds::asuncion())
            .build()
            .unwrap();

        let view = asuncion_view(11.5);
        assert!(restricted.visible_tiles(&view).len() <= unrestricted.visible_tiles(&view).len());

        let far_away = MapView::new(&latlon!(40.0, 10.0), 1.0)
            .with_zoom(14.0)
            .with_size(Size::new(800.0, 600.0));
        assert!(restricted.visible_tiles(&far_away).is_empty());
        assert!(!unrestricted.visible_tiles(&far_away).is_empty());
    }

    #[test]
    fn no_tiles_without_screen_size() {
        let layer = RasterTileLayerBuilder::new_osm().build().unwrap();
        let view = MapView::new(&GeographicBounds::asuncion().center(), 1.0).with_zoom(14.0);
        assert!(layer.visible_tiles(&view).is_empty());
    }
}
