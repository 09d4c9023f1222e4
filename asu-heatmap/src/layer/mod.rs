//! [Layers](Layer) specify a data source and the way the data should be rendered to the map.

use std::any::Any;

use maybe_sync::{MaybeSend, MaybeSync};

use crate::layer::attribution::Attribution;
use crate::render::Canvas;
use crate::view::MapView;

pub mod annotation_layer;
pub mod attribution;
pub mod image_overlay;
pub mod raster_tile_layer;

pub use annotation_layer::AnnotationLayer;
pub use image_overlay::ImageOverlay;
pub use raster_tile_layer::{RasterTileLayer, RasterTileLayerBuilder};

/// Layers specify a data source and the way the data should be rendered to the map.
///
/// There are 3 types of layers:
/// * [`RasterTileLayer`] - draws prerendered tiles from an Internet source as is.
/// * [`ImageOverlay`] - draws a single image stretched over a geographic rectangle.
/// * [`AnnotationLayer`] - draws a marker for every point feature and reacts to clicks on them.
pub trait Layer: MaybeSend + MaybeSync {
    /// Renders the layer to the given canvas.
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas);
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// A map stores layers as trait objects. This method can be used to convert the trait object
    /// into the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Returns the attribution of the layer, if available.
    fn attribution(&self) -> Option<Attribution> {
        None
    }
}
