//! [`TileSchema`] is used by tile layers to calculate [tile indices](TileIndex) needed for a
//! given [`MapView`].

use std::collections::BTreeSet;

use asu_heatmap_types::cartesian::{Point2d, Rect};

use crate::lod::Lod;
use crate::view::MapView;

const RESOLUTION_TOLERANCE: f64 = 0.01;
/// Fraction of a tile by which a bbox edge may miss a tile boundary and still count as on it.
const TILE_EDGE_TOLERANCE: f64 = 1e-6;
const WEB_MERCATOR_EXTENT: f64 = 20037508.342787;

/// Direction of the Y index of tiles.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VerticalDirection {
    /// Tiles with `Y == 0` are at the top of the map.
    TopToBottom,
    /// Tiles with `Y == 0` are at the bottom of the map.
    BottomToTop,
}

/// Tile index.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct TileIndex {
    /// X index.
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Tile schema specifies how tile indices are calculated based on the map position and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSchema {
    /// Position where all tiles have `X == 0, Y == 0` indices.
    pub origin: Point2d,
    /// Rectangle that contains all tiles of the tile scheme.
    pub bounds: Rect,
    /// Sorted set of levels of detail that specify resolutions for each z-level.
    pub lods: BTreeSet<Lod>,
    /// Width of a single tile in pixels.
    pub tile_width: u32,
    /// Height of a single tile in pixels.
    pub tile_height: u32,
    /// Direction of the Y-axis.
    pub y_direction: VerticalDirection,
}

impl TileSchema {
    /// Standard Web Mercator based tile scheme (used, for example, by OSM and Stadia).
    pub fn web(lods_count: u32) -> Self {
        let lods = (0..lods_count).filter_map(Lod::for_zoom).collect();

        TileSchema {
            origin: Point2d::new(-WEB_MERCATOR_EXTENT, WEB_MERCATOR_EXTENT),
            bounds: Rect::new(
                -WEB_MERCATOR_EXTENT,
                -WEB_MERCATOR_EXTENT,
                WEB_MERCATOR_EXTENT,
                WEB_MERCATOR_EXTENT,
            ),
            lods,
            tile_width: 256,
            tile_height: 256,
            y_direction: VerticalDirection::TopToBottom,
        }
    }

    /// Resolution of the given z-level, if exists.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        self.lods
            .iter()
            .find(|lod| lod.z_index() == z)
            .map(|lod| lod.resolution())
    }

    /// Select a level of detail for the given resolution: the coarsest level that is not
    /// noticeably coarser than the resolution.
    pub fn select_lod(&self, resolution: f64) -> Option<Lod> {
        if !resolution.is_finite() {
            return None;
        }

        let mut lods = self.lods.iter();
        let mut selected = lods.next()?;

        for lod in lods {
            if lod.resolution() * (1.0 - RESOLUTION_TOLERANCE) > resolution {
                break;
            }

            selected = lod;
        }

        Some(*selected)
    }

    /// Iterate over tile indices that should be displayed for the given map view.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        let lod = self.select_lod(view.resolution())?;
        self.iter_tiles_over_bbox(lod.z_index(), view.get_bbox()?)
    }

    /// Iterate over tile indices of the z-level `z` that intersect with the bounding box.
    /// Tiles outside the bounds of the schema are skipped.
    pub fn iter_tiles_over_bbox(
        &self,
        z: u32,
        bounding_box: Rect,
    ) -> Option<impl Iterator<Item = TileIndex>> {
        let resolution = self.lod_resolution(z)?;
        let bounding_box = bounding_box.limit(&self.bounds)?;

        let tile_w = resolution * self.tile_width as f64;
        let tile_h = resolution * self.tile_height as f64;

        let x_min = (self.x_adj(bounding_box.x_min()) / tile_w + TILE_EDGE_TOLERANCE).floor();
        let x_max = (self.x_adj(bounding_box.x_max()) / tile_w - TILE_EDGE_TOLERANCE).ceil() - 1.0;

        let (top, bottom) = match self.y_direction {
            VerticalDirection::TopToBottom => (bounding_box.y_max(), bounding_box.y_min()),
            VerticalDirection::BottomToTop => (bounding_box.y_min(), bounding_box.y_max()),
        };
        let y_min = (self.y_adj(top) / tile_h + TILE_EDGE_TOLERANCE).floor();
        let y_max = (self.y_adj(bottom) / tile_h - TILE_EDGE_TOLERANCE).ceil() - 1.0;

        let last_x = (self.bounds.width() / tile_w).round() as i32 - 1;
        let last_y = (self.bounds.height() / tile_h).round() as i32 - 1;

        let x_min = (x_min as i32).clamp(0, last_x.max(0));
        let y_min = (y_min as i32).clamp(0, last_y.max(0));
        let x_max = (x_max as i32).clamp(x_min, last_x.max(x_min));
        let y_max = (y_max as i32).clamp(y_min, last_y.max(y_min));

        Some(
            (x_min..=x_max)
                .flat_map(move |x| (y_min..=y_max).map(move |y| TileIndex::new(x, y, z))),
        )
    }

    fn x_adj(&self, x: f64) -> f64 {
        x - self.origin.x
    }

    fn y_adj(&self, y: f64) -> f64 {
        match self.y_direction {
            VerticalDirection::TopToBottom => self.origin.y - y,
            VerticalDirection::BottomToTop => y - self.origin.y,
        }
    }

    /// Projected rectangle covered by the tile.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<Rect> {
        let resolution = self.lod_resolution(index.z)?;
        let tile_w = self.tile_width as f64 * resolution;
        let tile_h = self.tile_height as f64 * resolution;

        let x_min = self.origin.x + index.x as f64 * tile_w;
        let y_min = match self.y_direction {
            VerticalDirection::TopToBottom => self.origin.y - (index.y + 1) as f64 * tile_h,
            VerticalDirection::BottomToTop => self.origin.y + index.y as f64 * tile_h,
        };

        Some(Rect::new(x_min, y_min, x_min + tile_w, y_min + tile_h))
    }
}
