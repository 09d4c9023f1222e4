//! The map: viewport, its limits and the layers drawn in it.

use std::time::Duration;

use asu_heatmap_types::cartesian::{Point2d, Size};
use asu_heatmap_types::geo::GeoPoint2d;
use web_time::SystemTime;

use crate::bounds::MaxBounds;
use crate::layer::attribution::Attribution;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::view::{resolution_to_zoom, zoom_to_resolution, MapView};

mod builder;
mod layer_collection;

pub use builder::MapBuilder;
pub use layer_collection::{LayerCollection, LayerId};

const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Duration of animated pans.
pub const PAN_DURATION: Duration = Duration::from_millis(250);

/// Map specifies a set of layers, and the view that should be rendered.
///
/// All changes of the view go through the zoom limits and the bounds of the map, so the view
/// (and the target of an animation) never leaves them.
pub struct Map {
    view: MapView,
    layers: LayerCollection,
    max_bounds: Option<MaxBounds>,
    min_zoom: f64,
    max_zoom: f64,
    messenger: Option<Box<dyn Messenger>>,
    animation: Option<AnimationParameters>,
}

struct AnimationParameters {
    start_view: MapView,
    end_view: MapView,
    start_time: SystemTime,
    duration: Duration,
}

impl Map {
    /// Creates a new map without zoom limits and bounds.
    pub fn new(
        view: MapView,
        layers: Vec<Box<dyn Layer>>,
        messenger: Option<Box<dyn Messenger + 'static>>,
    ) -> Self {
        Self {
            view,
            layers: layers.into(),
            max_bounds: None,
            min_zoom: 0.0,
            max_zoom: f64::INFINITY,
            messenger,
            animation: None,
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Returns the list of map's layers.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Returns a mutable reference to the list of map's layers.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Adds a layer on top of the others.
    pub fn add_layer(&mut self, layer: impl Layer + 'static) -> LayerId {
        let id = self.layers.push(layer);
        self.redraw();
        id
    }

    /// Removes the layer from the map and returns it.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let layer = self.layers.remove(id);
        if layer.is_some() {
            self.redraw();
        }
        layer
    }

    /// Stops drawing the layer, keeping it and its state in the map. Returns false if the map
    /// has no such layer.
    pub fn detach_layer(&mut self, id: LayerId) -> bool {
        let result = self.layers.hide(id);
        self.redraw();
        result
    }

    /// Draws a detached layer again. Returns false if the map has no such layer.
    pub fn attach_layer(&mut self, id: LayerId) -> bool {
        let result = self.layers.show(id);
        self.redraw();
        result
    }

    /// Returns true if the layer is in the map and drawn.
    pub fn is_attached(&self, id: LayerId) -> bool {
        self.layers.is_visible(id).unwrap_or(false)
    }

    /// Sets the zoom limits. The current view is adjusted to them.
    pub fn set_zoom_range(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.set_view(self.view);
    }

    /// Minimum zoom level.
    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    /// Maximum zoom level.
    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    /// The lowest zoom the view can currently have: the minimum zoom, raised if needed so that
    /// the whole screen fits inside the bounds.
    pub fn effective_min_zoom(&self) -> f64 {
        let (_, max_resolution) = self.resolution_limits(self.view.size());
        resolution_to_zoom(max_resolution)
    }

    /// Multiplies the resolution of the view by `factor` keeping the map point under
    /// `base_point` in place. The factor is limited to the zoom range of the map, and zooming
    /// past a limit leaves the view unchanged.
    pub fn zoom_view_around(&self, view: &MapView, factor: f64, base_point: Point2d) -> MapView {
        let (min_resolution, max_resolution) = self.resolution_limits(view.size());
        let resolution = view.resolution();
        let target = (resolution * factor).clamp(min_resolution, max_resolution);
        if !target.is_finite() || !resolution.is_finite() || resolution <= 0.0 {
            return *view;
        }

        view.zoom_around(target / resolution, base_point)
    }

    fn resolution_limits(&self, size: Size) -> (f64, f64) {
        let min_resolution = zoom_to_resolution(self.max_zoom);
        let mut max_resolution = zoom_to_resolution(self.min_zoom);

        if let Some(bounds) = &self.max_bounds {
            if !size.is_zero() {
                let rect = bounds.rect();
                let fitting = (rect.width() / size.width()).min(rect.height() / size.height());
                if fitting.is_finite() && fitting > 0.0 {
                    max_resolution = max_resolution.min(fitting);
                }
            }
        }

        (min_resolution.min(max_resolution), max_resolution)
    }

    /// Sets the bounds the view is kept in. The current view is adjusted to them.
    pub fn set_max_bounds(&mut self, max_bounds: Option<MaxBounds>) {
        self.max_bounds = max_bounds;
        self.set_view(self.view);
    }

    /// Bounds the view is kept in.
    pub fn max_bounds(&self) -> Option<&MaxBounds> {
        self.max_bounds.as_ref()
    }

    /// Applies the zoom limits and the bounds of the map to the view.
    pub fn constrain_view(&self, view: MapView) -> MapView {
        let view = self.constrain_zoom(view);
        match &self.max_bounds {
            Some(bounds) => bounds.constrain(&view),
            None => view,
        }
    }

    fn constrain_zoom(&self, view: MapView) -> MapView {
        let (min_resolution, max_resolution) = self.resolution_limits(view.size());
        let resolution = view.resolution();

        if !resolution.is_finite() || resolution > max_resolution {
            view.with_resolution(max_resolution)
        } else if resolution < min_resolution {
            view.with_resolution(min_resolution)
        } else {
            view
        }
    }

    /// Changes the view of the map to the given one, stopping the current animation.
    pub fn set_view(&mut self, view: MapView) {
        self.animation = None;
        self.view = self.constrain_view(view);
        self.redraw();
    }

    /// Changes the view while the user drags the map. Viscous bounds let the view overshoot them
    /// until the drag ends.
    pub fn set_view_elastic(&mut self, view: MapView) {
        self.animation = None;
        let view = self.constrain_zoom(view);
        self.view = match &self.max_bounds {
            Some(bounds) => bounds.constrain_elastic(&view),
            None => view,
        };
        self.redraw();
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.view.zoom()
    }

    /// Geographic position of the center of the view.
    pub fn center(&self) -> Option<GeoPoint2d> {
        self.view.position()
    }

    /// Changes the zoom level keeping the center of the view.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.set_view(self.view.with_zoom(zoom));
    }

    /// Moves the center of the view keeping the zoom level.
    pub fn set_center(&mut self, center: &GeoPoint2d) {
        self.set_view(self.view.with_position(center));
    }

    /// Centers the view on the point at the given zoom level, either at once or with an animation.
    pub fn pan_to(&mut self, point: &GeoPoint2d, zoom: f64, animated: bool) {
        let target = self.target_view().with_position(point).with_zoom(zoom);
        if animated {
            self.animate_to(target, PAN_DURATION);
        } else {
            self.set_view(target);
        }
    }

    /// Request redraw of the map.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Update the view of the map before the rendering in case [`Map::animate_to`] was called.
    pub fn animate(&mut self) {
        let Some(animation) = &self.animation else {
            return;
        };

        let now = SystemTime::now();
        let k = now
            .duration_since(animation.start_time)
            .unwrap_or_default()
            .as_secs_f64()
            / animation.duration.as_secs_f64();

        if k >= 1.0 || !k.is_finite() {
            self.view = animation.end_view;
            self.animation = None;
        } else {
            self.view = animation.start_view.interpolate(&animation.end_view, k);
        }

        self.redraw();
    }

    /// Returns true while an animation is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Target view of the current animation.
    pub fn target_view(&self) -> &MapView {
        self.animation
            .as_ref()
            .map(|v| &v.end_view)
            .unwrap_or(&self.view)
    }

    /// Request a gradual change of the map view to the specified view. The target is adjusted to
    /// the limits of the map.
    pub fn animate_to(&mut self, target: MapView, duration: Duration) {
        let end_view = self.constrain_view(target.with_size(self.view.size()));
        if duration.is_zero() {
            self.set_view(end_view);
            return;
        }

        self.animation = Some(AnimationParameters {
            start_view: self.view,
            end_view,
            start_time: SystemTime::now() - FRAME_DURATION,
            duration,
        });
        self.redraw();
    }

    /// Set the size of the map.
    pub fn set_size(&mut self, new_size: Size) {
        if self.view.size() == new_size {
            return;
        }

        self.view = self.constrain_view(self.view.with_size(new_size));
        let end_view = self
            .animation
            .as_ref()
            .map(|animation| self.constrain_view(animation.end_view.with_size(new_size)));
        if let (Some(animation), Some(end_view)) = (&mut self.animation, end_view) {
            animation.start_view = animation.start_view.with_size(new_size);
            animation.end_view = end_view;
        }
    }

    /// Sets the new event messenger for the map.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.messenger = messenger.map(|m| Box::new(m) as Box<dyn Messenger>);
    }

    /// Attributions of the visible layers.
    pub fn attributions(&self) -> Vec<Attribution> {
        let mut attributions: Vec<Attribution> = vec![];
        for attribution in self.layers.iter_visible().filter_map(|layer| layer.attribution()) {
            if !attributions.contains(&attribution) {
                attributions.push(attribution);
            }
        }

        attributions
    }

    /// Draws all visible layers from bottom to top.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let view = self.view.with_size(canvas.size());
        for layer in self.layers.iter_visible() {
            layer.render(&view, canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use asu_heatmap_types::cartesian::Point2d;
    use asu_heatmap_types::geo::GeoPoint;
    use asu_heatmap_types::latlon;

    use super::*;
    use crate::bounds::GeographicBounds;
    use crate::config::MapConfig;
    use crate::layer::tests::TestLayer;
    use crate::render::tests::RecordingCanvas;

    fn test_map() -> Map {
        let mut map = MapBuilder::from_config(&MapConfig::default()).unwrap().build();
        map.set_size(Size::new(800.0, 600.0));
        map
    }

    fn visible_corners_inside(map: &Map) -> bool {
        let bounds = GeographicBounds::asuncion().projected().unwrap();
        let visible = map.view().get_bbox().unwrap();
        let eps = 1e-6;
        visible.x_min() >= bounds.x_min() - eps
            && visible.x_max() <= bounds.x_max() + eps
            && visible.y_min() >= bounds.y_min() - eps
            && visible.y_max() <= bounds.y_max() + eps
    }

    #[derive(Clone, Default)]
    struct CountingMessenger(Arc<AtomicUsize>);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn initial_framing() {
        let map = test_map();
        assert_relative_eq!(map.zoom(), 14.0, epsilon = 1e-9);
        let center = map.center().unwrap();
        assert_relative_eq!(center.lat(), -25.295239, epsilon = 1e-6);
        assert_relative_eq!(center.lon(), -57.625608, epsilon = 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut map = test_map();
        map.set_zoom(5.0);
        assert_relative_eq!(map.zoom(), 11.5, epsilon = 1e-9);
        map.set_zoom(25.0);
        assert_relative_eq!(map.zoom(), 19.0, epsilon = 1e-9);
        map.set_zoom(16.3);
        assert_relative_eq!(map.zoom(), 16.3, epsilon = 1e-9);
    }

    #[test]
    fn panning_beyond_bounds_is_clamped() {
        let mut map = test_map();
        for target in [
            latlon!(-20.0, -57.5),
            latlon!(-30.0, -57.5),
            latlon!(-25.3, -50.0),
            latlon!(-25.3, -65.0),
            latlon!(-26.0, -58.0),
        ] {
            map.set_center(&target);
            assert!(visible_corners_inside(&map), "escaped bounds at {target:?}");
        }
    }

    #[test]
    fn zooming_out_stays_inside() {
        let mut map = test_map();
        map.set_center(&latlon!(-24.9, -57.15));
        map.set_zoom(11.5);
        assert!(visible_corners_inside(&map));
    }

    #[test]
    fn wide_window_at_min_zoom_stays_inside() {
        let mut map = test_map();
        map.set_size(Size::new(1920.0, 1080.0));
        map.set_zoom(map.min_zoom());

        assert!(map.zoom() > map.min_zoom());
        assert_relative_eq!(map.zoom(), map.effective_min_zoom(), epsilon = 1e-9);
        assert!(visible_corners_inside(&map));

        map.set_size(Size::new(800.0, 600.0));
        map.set_zoom(map.min_zoom());
        assert_relative_eq!(map.zoom(), 11.5, epsilon = 1e-9);
        assert!(visible_corners_inside(&map));
    }

    #[test]
    fn growing_window_raises_zoom() {
        let mut map = test_map();
        map.set_zoom(11.5);
        map.set_size(Size::new(4000.0, 4000.0));

        assert!(map.zoom() > 11.5);
        assert!(visible_corners_inside(&map));
    }

    #[test]
    fn zooming_out_past_the_limit_does_not_pan() {
        let mut map = test_map();
        map.set_zoom(11.5);
        let view = *map.view();

        let zoomed = map.zoom_view_around(&view, 1.2, Point2d::new(700.0, 300.0));
        assert_abs_diff_eq!(
            zoomed.projected_position(),
            view.projected_position(),
            epsilon = 1e-6
        );
        assert_relative_eq!(zoomed.zoom(), 11.5, epsilon = 1e-9);
    }

    #[test]
    fn pan_to_animated_sets_target() {
        let mut map = test_map();
        let point = latlon!(-25.28, -57.63);
        map.pan_to(&point, 18.0, true);

        assert!(map.is_animating());
        let target = map.target_view();
        assert_relative_eq!(target.zoom(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(target.position().unwrap().lat(), -25.28, epsilon = 1e-6);
        assert_relative_eq!(map.zoom(), 14.0, epsilon = 1e-9);
    }

    #[test]
    fn pan_to_immediate() {
        let mut map = test_map();
        map.pan_to(&latlon!(-25.28, -57.63), 18.0, false);
        assert!(!map.is_animating());
        assert_relative_eq!(map.zoom(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(map.center().unwrap().lon(), -57.63, epsilon = 1e-6);
    }

    #[test]
    fn animation_target_is_clamped() {
        let mut map = test_map();
        map.animate_to(map.view().with_position(&latlon!(0.0, 0.0)).with_zoom(3.0), PAN_DURATION);

        let mut clamped = test_map();
        clamped.set_view(clamped.view().with_position(&latlon!(0.0, 0.0)).with_zoom(3.0));
        assert_eq!(*map.target_view(), *clamped.view());
    }

    #[test]
    fn animation_finishes() {
        let mut map = test_map();
        map.animate_to(
            map.view().with_zoom(15.0),
            Duration::from_millis(1),
        );
        std::thread::sleep(Duration::from_millis(5));
        map.animate();

        assert!(!map.is_animating());
        assert_relative_eq!(map.zoom(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn detached_layers_are_not_rendered() {
        let mut map = test_map();
        let a = map.add_layer(TestLayer("a"));
        let b = map.add_layer(TestLayer("b"));

        assert!(map.detach_layer(a));
        assert!(!map.is_attached(a));

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        map.render(&mut canvas);
        let sources: Vec<_> = canvas.images().into_iter().map(|(s, _, _)| s).collect();
        assert_eq!(sources, vec!["b"]);

        assert!(map.attach_layer(a));
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        map.render(&mut canvas);
        let sources: Vec<_> = canvas.images().into_iter().map(|(s, _, _)| s).collect();
        assert_eq!(sources, vec!["a", "b"]);

        assert!(map.remove_layer(b).is_some());
        assert!(!map.attach_layer(b));
    }

    #[test]
    fn view_changes_request_redraw() {
        let mut map = test_map();
        let messenger = CountingMessenger::default();
        map.set_messenger(Some(messenger.clone()));

        map.set_zoom(15.0);
        map.add_layer(TestLayer("a"));
        assert_eq!(messenger.0.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn map_without_bounds() {
        let mut map = Map::new(MapView::new_projected(Point2d::origin(), 1.0), vec![], None);
        map.set_view(map.view().with_projected_position(Point2d::new(1e7, 1e7)));
        assert_eq!(map.view().projected_position(), Point2d::new(1e7, 1e7));
        assert!(map.view().get_bbox().is_none());
    }
}
