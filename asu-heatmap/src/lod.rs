use crate::view::{resolution_to_zoom, zoom_to_resolution};

/// Tile z-level paired with the map resolution its tiles are drawn at without scaling.
///
/// Levels compare by resolution only, so a sorted set of them goes from the finest to the
/// coarsest level.
#[derive(Debug, Clone, Copy)]
pub struct Lod {
    resolution: f64,
    z_index: u32,
}

impl Lod {
    /// Level with an explicit resolution. `None` unless the resolution is a positive number.
    pub fn new(resolution: f64, z_index: u32) -> Option<Lod> {
        (resolution.is_finite() && resolution > 0.0).then_some(Self {
            resolution,
            z_index,
        })
    }

    /// Level `z` of the web tile scheme, where every level halves the resolution of the previous
    /// one.
    pub fn for_zoom(z: u32) -> Option<Lod> {
        Self::new(zoom_to_resolution(z as f64), z)
    }

    /// Z-index of the tiles.
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Map units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Fractional map zoom at which the tiles of this level are shown pixel to pixel.
    pub fn zoom(&self) -> f64 {
        resolution_to_zoom(self.resolution)
    }
}

impl PartialEq for Lod {
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution
    }
}

impl Eq for Lod {}

impl PartialOrd for Lod {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lod {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.resolution.total_cmp(&other.resolution)
    }
}
