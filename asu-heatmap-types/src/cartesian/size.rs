use serde::{Deserialize, Serialize};

/// Width and height of a rectangular area, e.g. the screen the map is drawn to.
///
/// Negative dimensions are clamped to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Half of the width.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the height.
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Returns true if the area is empty.
    pub fn is_zero(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}
