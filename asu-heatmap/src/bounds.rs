//! Geographic extent of the map and the viewport clamp derived from it.

use asu_heatmap_types::cartesian::{Rect, Vector2d};
use asu_heatmap_types::geo::{GeoPoint, GeoPoint2d, NewGeoPoint, Projection, WebMercator};
use serde::{Deserialize, Serialize};

use crate::error::HeatmapError;
use crate::view::MapView;

/// Rectangle on the Earth surface given by its lower-left and upper-right corners, plus the point
/// the map is initially centered on.
///
/// The center is chosen for framing and does not have to be the centroid of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicBounds {
    lower_left: GeoPoint2d,
    upper_right: GeoPoint2d,
    center: GeoPoint2d,
}

impl GeographicBounds {
    /// Creates new bounds, checking that the lower-left corner is strictly south-west of the
    /// upper-right one.
    pub fn new(
        lower_left: GeoPoint2d,
        upper_right: GeoPoint2d,
        center: GeoPoint2d,
    ) -> Result<Self, HeatmapError> {
        let bounds = Self {
            lower_left,
            upper_right,
            center,
        };
        bounds.validate()?;

        Ok(bounds)
    }

    /// Extent of the Asunción heat-map image.
    pub fn asuncion() -> Self {
        Self {
            lower_left: GeoPoint2d::latlon(-25.70095, -57.83323),
            upper_right: GeoPoint2d::latlon(-24.8821, -57.14187),
            center: GeoPoint2d::latlon(-25.295239, -57.625608),
        }
    }

    /// Checks the invariants of the bounds. Deserialized values are not checked until this is
    /// called.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        for point in [&self.lower_left, &self.upper_right, &self.center] {
            if !point.is_valid() {
                return Err(HeatmapError::InvalidBounds(format!(
                    "point ({}, {}) is not a valid coordinate",
                    point.lat(),
                    point.lon()
                )));
            }
        }

        if self.lower_left.lat() >= self.upper_right.lat()
            || self.lower_left.lon() >= self.upper_right.lon()
        {
            return Err(HeatmapError::InvalidBounds(format!(
                "lower-left corner ({}, {}) must be south-west of upper-right corner ({}, {})",
                self.lower_left.lat(),
                self.lower_left.lon(),
                self.upper_right.lat(),
                self.upper_right.lon()
            )));
        }

        Ok(())
    }

    /// South-west corner.
    pub fn lower_left(&self) -> GeoPoint2d {
        self.lower_left
    }

    /// North-east corner.
    pub fn upper_right(&self) -> GeoPoint2d {
        self.upper_right
    }

    /// Initial center of the map.
    pub fn center(&self) -> GeoPoint2d {
        self.center
    }

    /// Returns true if the point lies inside the bounds (edges included).
    pub fn contains(&self, point: &impl GeoPoint) -> bool {
        point.lat() >= self.lower_left.lat()
            && point.lat() <= self.upper_right.lat()
            && point.lon() >= self.lower_left.lon()
            && point.lon() <= self.upper_right.lon()
    }

    /// The bounds in Web Mercator coordinates.
    pub fn projected(&self) -> Option<Rect> {
        let projection = WebMercator::default();
        let lower_left = projection.project(&self.lower_left)?;
        let upper_right = projection.project(&self.upper_right)?;

        Some(Rect::new(
            lower_left.x,
            lower_left.y,
            upper_right.x,
            upper_right.y,
        ))
    }
}

impl Default for GeographicBounds {
    fn default() -> Self {
        Self::asuncion()
    }
}

/// Keeps the map viewport inside a projected rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxBounds {
    rect: Rect,
    viscosity: f64,
}

impl MaxBounds {
    /// Creates a clamp for the given rectangle.
    ///
    /// `viscosity` is clamped into `[0, 1]`. The value of `1.0` makes the bounds rigid, lesser
    /// values let a drag push the view out of the bounds by `1 - viscosity` of the overshoot.
    pub fn new(rect: Rect, viscosity: f64) -> Self {
        let viscosity = if viscosity.is_finite() {
            viscosity.clamp(0.0, 1.0)
        } else {
            1.0
        };

        Self { rect, viscosity }
    }

    /// Creates a clamp from geographic bounds.
    pub fn from_geographic(bounds: &GeographicBounds, viscosity: f64) -> Option<Self> {
        Some(Self::new(bounds.projected()?, viscosity))
    }

    /// Projected rectangle the view is kept in.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Viscosity of the bounds.
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    /// Moves the view so that it does not leave the bounds.
    ///
    /// If the visible area is larger than the bounds along an axis, the view is centered on the
    /// bounds along that axis. If the size of the view is unknown, only the center point is
    /// clamped.
    pub fn constrain(&self, view: &MapView) -> MapView {
        let offset = self.offset(view);
        view.with_projected_position(view.projected_position() + offset)
    }

    /// Same as [`MaxBounds::constrain`], but lets the view overshoot the bounds according to the
    /// viscosity. Used while the map is being dragged.
    pub fn constrain_elastic(&self, view: &MapView) -> MapView {
        let offset = self.offset(view) * self.viscosity;
        view.with_projected_position(view.projected_position() + offset)
    }

    /// Returns true if the visible area of the view lies within the bounds along every axis the
    /// view fits in.
    pub fn is_satisfied(&self, view: &MapView) -> bool {
        let offset = self.offset(view);
        offset.x.abs() < 1e-6 && offset.y.abs() < 1e-6
    }

    fn offset(&self, view: &MapView) -> Vector2d {
        let position = view.projected_position();
        let half_width = view.size().half_width() * view.resolution();
        let half_height = view.size().half_height() * view.resolution();

        Vector2d::new(
            axis_offset(position.x, half_width, self.rect.x_min(), self.rect.x_max()),
            axis_offset(position.y, half_height, self.rect.y_min(), self.rect.y_max()),
        )
    }
}

fn axis_offset(center: f64, half_extent: f64, min: f64, max: f64) -> f64 {
    if 2.0 * half_extent >= max - min {
        return (min + max) / 2.0 - center;
    }

    if center - half_extent < min {
        min - (center - half_extent)
    } else if center + half_extent > max {
        max - (center + half_extent)
    } else {
        0.0
    }
}
