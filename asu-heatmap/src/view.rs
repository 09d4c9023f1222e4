//! Viewport of the map: which part of the projected plane is shown and at what scale.

use asu_heatmap_types::cartesian::{Point2d, Rect, Size, Vector2d};
use asu_heatmap_types::geo::{GeoPoint2d, Projection, WebMercator};

/// Resolution of the z-level 0 of the standard web tile scheme.
pub const TOP_RESOLUTION: f64 = 156543.03392800014;

/// Converts a (possibly fractional) zoom level into resolution.
pub fn zoom_to_resolution(zoom: f64) -> f64 {
    TOP_RESOLUTION / 2f64.powf(zoom)
}

/// Converts resolution into a (possibly fractional) zoom level.
pub fn resolution_to_zoom(resolution: f64) -> f64 {
    (TOP_RESOLUTION / resolution).log2()
}

/// Map view specifies the area of the map that should be drawn: position of the center of the
/// screen on the Web Mercator plane, resolution (map units per screen pixel) and the size of the
/// screen in pixels.
///
/// Screen coordinates start at the top-left corner of the map area, Y axis goes down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::origin(),
            resolution: 1.0,
            size: Size::new(0.0, 0.0),
        }
    }
}

impl MapView {
    /// Creates a new view centered on the geographic point. Points outside of the Web Mercator
    /// domain are replaced with the origin.
    pub fn new(position: &GeoPoint2d, resolution: f64) -> Self {
        let projected = WebMercator::default().project(position).unwrap_or_else(|| {
            log::warn!("cannot project {position:?}, falling back to the origin");
            Point2d::origin()
        });

        Self::new_projected(projected, resolution)
    }

    /// Creates a new view centered on the projected point.
    pub fn new_projected(position: Point2d, resolution: f64) -> Self {
        Self {
            position,
            resolution,
            ..Default::default()
        }
    }

    /// Geographic position of the center of the view.
    pub fn position(&self) -> Option<GeoPoint2d> {
        WebMercator::default().unproject(&self.position)
    }

    /// Projected position of the center of the view.
    pub fn projected_position(&self) -> Point2d {
        self.position
    }

    /// Returns a copy of the view with the given center.
    pub fn with_position(&self, position: &GeoPoint2d) -> Self {
        match WebMercator::default().project(position) {
            Some(projected) => self.with_projected_position(projected),
            None => *self,
        }
    }

    /// Returns a copy of the view with the given projected center.
    pub fn with_projected_position(&self, position: Point2d) -> Self {
        Self { position, ..*self }
    }

    /// Map units per pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns a copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Fractional zoom level corresponding to the resolution of the view.
    pub fn zoom(&self) -> f64 {
        resolution_to_zoom(self.resolution)
    }

    /// Returns a copy of the view with the resolution of the given zoom level.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        self.with_resolution(zoom_to_resolution(zoom))
    }

    /// Size of the screen.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given screen size.
    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }

    /// Projected area visible on the screen. `None` if the size of the screen is not known yet.
    pub fn get_bbox(&self) -> Option<Rect> {
        if self.size.is_zero() {
            return None;
        }

        let half_width = self.size.half_width() * self.resolution;
        let half_height = self.size.half_height() * self.resolution;

        Some(Rect::new(
            self.position.x - half_width,
            self.position.y - half_height,
            self.position.x + half_width,
            self.position.y + half_height,
        ))
    }

    /// Converts a projected point into screen pixels.
    pub fn map_to_screen(&self, point: &Point2d) -> Point2d {
        Point2d::new(
            (point.x - self.position.x) / self.resolution + self.size.half_width(),
            self.size.half_height() - (point.y - self.position.y) / self.resolution,
        )
    }

    /// Converts a projected rectangle into a screen rectangle.
    pub fn rect_to_screen(&self, rect: &Rect) -> Rect {
        let top_left = self.map_to_screen(&Point2d::new(rect.x_min(), rect.y_max()));
        let bottom_right = self.map_to_screen(&Point2d::new(rect.x_max(), rect.y_min()));

        Rect::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    /// Converts a screen point into the projected coordinates.
    pub fn screen_to_map(&self, px_position: Point2d) -> Point2d {
        Point2d::new(
            self.position.x + (px_position.x - self.size.half_width()) * self.resolution,
            self.position.y + (self.size.half_height() - px_position.y) * self.resolution,
        )
    }

    /// Moves the view so that the map point under `from` ends up under `to`.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let delta = self.screen_to_map(to) - self.screen_to_map(from);
        self.translate(delta)
    }

    /// Moves the map content by `delta` projected units.
    pub fn translate(&self, delta: Vector2d) -> Self {
        Self {
            position: self.position - delta,
            ..*self
        }
    }

    /// Multiplies the resolution by `factor`, keeping the map point under `base_point` in place.
    pub fn zoom_around(&self, factor: f64, base_point: Point2d) -> Self {
        let base_point = self.screen_to_map(base_point);
        let position = base_point + (self.position - base_point) * factor;

        Self {
            position,
            resolution: self.resolution * factor,
            ..*self
        }
    }

    /// Linear interpolation between two views. The size of `self` is kept.
    pub fn interpolate(&self, target: &MapView, k: f64) -> Self {
        Self {
            position: self.position + (target.position - self.position) * k,
            resolution: self.resolution + (target.resolution - self.resolution) * k,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn zoom_and_resolution() {
        assert_relative_eq!(zoom_to_resolution(0.0), TOP_RESOLUTION);
        assert_relative_eq!(zoom_to_resolution(14.0), TOP_RESOLUTION / 16384.0);
        assert_relative_eq!(resolution_to_zoom(zoom_to_resolution(11.5)), 11.5);

        let view = MapView::default().with_zoom(18.0);
        assert_relative_eq!(view.zoom(), 18.0);
    }

    #[test]
    fn screen_to_map_size() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-50.0, 50.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(50.0, 50.0)),
            Point2d::new(0.0, 0.0),
            epsilon = 0.0001,
        );

        let view = MapView::default().with_size(Size::new(200.0, 50.0));
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(25.0, 49.0)),
            Point2d::new(-75.0, -24.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn screen_to_map_position_and_resolution() {
        let view = MapView::new_projected(Point2d::new(-100.0, -100.0), 2.0)
            .with_size(Size::new(100.0, 100.0));

        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(0.0, 0.0)),
            Point2d::new(-200.0, 0.0),
            epsilon = 0.0001,
        );
        assert_abs_diff_eq!(
            view.screen_to_map(Point2d::new(100.0, 100.0)),
            Point2d::new(0.0, -200.0),
            epsilon = 0.0001,
        );
    }

    #[test]
    fn map_to_screen_is_inverse() {
        let view = MapView::new_projected(Point2d::new(-6414853.3, -2912051.9), 9.55)
            .with_size(Size::new(800.0, 600.0));
        let screen = Point2d::new(123.0, 456.0);
        let map = view.screen_to_map(screen);
        assert_abs_diff_eq!(view.map_to_screen(&map), screen, epsilon = 1e-6);
    }

    #[test]
    fn bbox_is_none_for_zero_size() {
        let view = MapView::default();
        assert!(view.get_bbox().is_none());

        let view = view.with_size(Size::new(10.0, 20.0));
        assert_eq!(view.get_bbox(), Some(Rect::new(-5.0, -10.0, 5.0, 10.0)));
    }

    #[test]
    fn rect_to_screen_flips_y() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));
        let rect = view.rect_to_screen(&Rect::new(-10.0, 0.0, 10.0, 20.0));
        assert_eq!(rect, Rect::new(40.0, 30.0, 60.0, 50.0));
    }

    #[test]
    fn translate_by_pixels_moves_content() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));
        let moved = view.translate_by_pixels(Point2d::new(50.0, 50.0), Point2d::new(60.0, 40.0));
        assert_abs_diff_eq!(moved.projected_position(), Point2d::new(-10.0, -10.0));
    }

    #[test]
    fn zoom_around_keeps_base_point() {
        let view = MapView::default().with_size(Size::new(100.0, 100.0));
        let base = Point2d::new(10.0, 10.0);
        let before = view.screen_to_map(base);
        let zoomed = view.zoom_around(0.5, base);

        assert_relative_eq!(zoomed.resolution(), 0.5);
        assert_abs_diff_eq!(zoomed.screen_to_map(base), before, epsilon = 1e-9);
    }

    #[test]
    fn interpolate_halfway() {
        let start = MapView::new_projected(Point2d::new(0.0, 0.0), 10.0);
        let end = MapView::new_projected(Point2d::new(100.0, -100.0), 20.0);
        let mid = start.interpolate(&end, 0.5);

        assert_abs_diff_eq!(mid.projected_position(), Point2d::new(50.0, -50.0));
        assert_relative_eq!(mid.resolution(), 15.0);
    }
}
