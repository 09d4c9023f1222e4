//! Drawing surface the layers render to.

use asu_heatmap_types::cartesian::{Point2d, Rect, Size};

/// Surface the map is drawn on.
///
/// Layers only decide what is drawn and where: images are referenced by their source URL and
/// placed in screen pixels. Fetching, decoding and painting are up to the implementation.
pub trait Canvas {
    /// Size of the surface in pixels.
    fn size(&self) -> Size;
    /// Draws the image loaded from `source`, stretched over `screen_rect`.
    ///
    /// Implementations skip images that are not loaded (yet) or failed to load.
    fn draw_image(&mut self, source: &str, screen_rect: Rect, opacity: f32);
    /// Draws a text popup whose tip points at `anchor`.
    fn draw_popup(&mut self, anchor: Point2d, text: &str);
}
