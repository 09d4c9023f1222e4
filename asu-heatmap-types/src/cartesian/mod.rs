//! Types on the projected plane and in screen pixels.

mod rect;
mod size;

pub use rect::Rect;
pub use size::Size;

/// Point on a cartesian plane.
pub type Point2d = nalgebra::Point2<f64>;

/// Difference between two [`Point2d`]s.
pub type Vector2d = nalgebra::Vector2<f64>;
