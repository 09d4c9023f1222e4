use serde::{Deserialize, Serialize};

use super::Point2d;

/// Axis-aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x_min: f64,
    /// Bottom edge on the map plane, top edge on the screen.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Top edge on the map plane, bottom edge on the screen.
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle. The corners are normalized, so the order of the coordinates does
    /// not matter.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Left edge.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Right edge.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Lower edge.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Upper edge.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2d {
        Point2d::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Smallest rectangle containing all the points, or `None` if the iterator is empty.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2d>) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in points {
            rect.x_min = rect.x_min.min(p.x);
            rect.y_min = rect.y_min.min(p.y);
            rect.x_max = rect.x_max.max(p.x);
            rect.y_max = rect.y_max.max(p.y);
        }

        Some(rect)
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2d) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Returns true if `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    /// Returns true if the rectangles have common area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_max > other.x_min
            && self.x_min < other.x_max
            && self.y_max > other.y_min
            && self.y_min < other.y_max
    }

    /// Common area of two rectangles, `None` if they do not intersect.
    pub fn limit(&self, other: &Rect) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        Some(Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        })
    }

    /// Moves the rectangle by the given offsets.
    pub fn shift(&self, dx: f64, dy: f64) -> Self {
        Self {
            x_min: self.x_min + dx,
            x_max: self.x_max + dx,
            y_min: self.y_min + dy,
            y_max: self.y_max + dy,
        }
    }

    /// Scales the rectangle around its center.
    pub fn magnify(&self, factor: f64) -> Self {
        let center = self.center();
        let half_width = self.width() / 2.0 * factor;
        let half_height = self.height() / 2.0 * factor;
        Self {
            x_min: center.x - half_width,
            x_max: center.x + half_width,
            y_min: center.y - half_height,
            y_max: center.y + half_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let rect = Rect::new(10.0, 5.0, -10.0, -5.0);
        assert_eq!(rect, Rect::new(-10.0, -5.0, 10.0, 5.0));
        assert_eq!(rect.width(), 20.0);
        assert_eq!(rect.height(), 10.0);
        assert_eq!(rect.center(), Point2d::new(0.0, 0.0));
    }

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 2.0),
            Point2d::new(-3.0, 4.0),
            Point2d::new(0.0, -1.0),
        ];
        let rect = Rect::from_points(points.iter()).expect("not empty");
        assert_eq!(rect, Rect::new(-3.0, -1.0, 1.0, 4.0));
        assert!(Rect::from_points([].iter()).is_none());
    }

    #[test]
    fn containment_and_intersection() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        let inner = Rect::new(2.0, 2.0, 4.0, 4.0);
        let crossing = Rect::new(8.0, 8.0, 12.0, 12.0);
        let apart = Rect::new(20.0, 20.0, 30.0, 30.0);

        assert!(outer.contains(&Point2d::new(10.0, 0.0)));
        assert!(!outer.contains(&Point2d::new(10.1, 0.0)));
        assert!(outer.contains_rect(&inner));
        assert!(!outer.contains_rect(&crossing));
        assert!(outer.intersects(&crossing));
        assert!(!outer.intersects(&apart));
    }

    #[test]
    fn shift_and_magnify() {
        let rect = Rect::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(rect.shift(1.0, -1.0), Rect::new(1.0, -1.0, 3.0, 1.0));
        assert_eq!(rect.magnify(2.0), Rect::new(-1.0, -1.0, 3.0, 3.0));
    }

    #[test]
    fn limit_returns_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        assert_eq!(a.limit(&b), Some(Rect::new(5.0, 0.0, 10.0, 5.0)));
        assert_eq!(a.limit(&Rect::new(11.0, 11.0, 12.0, 12.0)), None);
    }
}
