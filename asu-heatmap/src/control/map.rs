use std::time::Duration;

use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::map::Map;

const DEFAULT_ZOOM_DURATION: Duration = Duration::from_millis(50);
const DOUBLE_CLICK_ZOOM_DURATION: Duration = Duration::from_millis(250);

/// Configuration of a [`MapController`]
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MapControllerConfiguration {
    zoom_duration: Duration,
    zoom_speed: f64,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self {
            zoom_duration: DEFAULT_ZOOM_DURATION,
            zoom_speed: 0.2,
        }
    }
}

impl MapControllerConfiguration {
    /// Duration of the zoom animation when mouse wheel is turned.
    pub fn zoom_duration(&self) -> Duration {
        self.zoom_duration
    }

    /// Sets duration of the zoom animation when mouse wheel is turned.
    pub fn with_zoom_duration(mut self, duration: Duration) -> Self {
        self.zoom_duration = duration;
        self
    }

    /// Magnitude of the zoom on every mouse wheel turn.
    ///
    /// For example, the value of `0.2` means, that every time the mouse wheel is turned, the map
    /// will be zoomed by 0.2 times.
    pub fn zoom_speed(&self) -> f64 {
        self.zoom_speed
    }

    /// Sets magnitude of the zoom on every mouse wheel turn.
    pub fn with_zoom_speed(mut self, speed: f64) -> Self {
        self.zoom_speed = speed;
        self
    }
}

/// Event handler of a map, providing panning and zooming.
///
/// The zoom limits and the bounds are enforced by the [`Map`] itself. Zooming goes through
/// [`Map::zoom_view_around`], so turning the wheel at a zoom limit leaves the map in place.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new instance of `MapController` with the given configuration.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Returns the current configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    /// Update the configuration of the controller.
    pub fn set_config(&mut self, config: MapControllerConfiguration) {
        self.config = config;
    }

    fn get_zoom(&self, delta: f64) -> f64 {
        (self.config.zoom_speed + 1.0).powf(-delta)
    }
}

impl UserEventHandler for MapController {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::DragStarted(MouseButton::Left | MouseButton::Other, _) => {
                EventPropagation::Consume
            }
            UserEvent::Drag(MouseButton::Left | MouseButton::Other, delta, e) => {
                let current_position = e.screen_pointer_position;
                let prev_position = current_position - *delta;

                let target = map
                    .view()
                    .translate_by_pixels(prev_position, current_position);
                map.set_view_elastic(target);

                EventPropagation::Stop
            }
            UserEvent::DragEnded(..) => {
                let view = *map.view();
                map.set_view(view);

                EventPropagation::Stop
            }
            UserEvent::Scroll(delta, mouse_event) => {
                let zoom = self.get_zoom(*delta);
                let target = map.zoom_view_around(
                    map.target_view(),
                    zoom,
                    mouse_event.screen_pointer_position,
                );
                map.animate_to(target, self.config.zoom_duration);

                EventPropagation::Stop
            }
            UserEvent::DoubleClick(MouseButton::Left, mouse_event) => {
                let target = map.zoom_view_around(
                    map.target_view(),
                    0.5,
                    mouse_event.screen_pointer_position,
                );
                map.animate_to(target, DOUBLE_CLICK_ZOOM_DURATION);

                EventPropagation::Stop
            }
            UserEvent::Zoom(zoom, center) => {
                let target = map.zoom_view_around(map.view(), *zoom, *center);
                map.set_view(target);

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use asu_heatmap_types::cartesian::{Point2d, Size};

    use super::*;
    use crate::bounds::GeographicBounds;
    use crate::config::MapConfig;
    use crate::control::{EventProcessor, RawUserEvent};
    use crate::map::MapBuilder;

    fn asuncion_map() -> Map {
        let mut map = MapBuilder::from_config(&MapConfig::default()).unwrap().build();
        map.set_size(Size::new(800.0, 600.0));
        map
    }

    fn processor() -> EventProcessor {
        let mut processor = EventProcessor::default();
        processor.add_handler(MapController::new(
            MapControllerConfiguration::default().with_zoom_duration(Duration::ZERO),
        ));
        processor
    }

    fn drag(processor: &mut EventProcessor, map: &mut Map, from: Point2d, to: Point2d) {
        processor.handle(RawUserEvent::PointerMoved(from), map);
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left), map);
        processor.handle(RawUserEvent::PointerMoved(to), map);
        processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left), map);
    }

    #[test]
    fn drag_moves_map_with_pointer() {
        let mut map = asuncion_map();
        let mut processor = processor();
        let before = map.view().screen_to_map(Point2d::new(400.0, 300.0));

        drag(
            &mut processor,
            &mut map,
            Point2d::new(400.0, 300.0),
            Point2d::new(450.0, 320.0),
        );

        let after = map.view().screen_to_map(Point2d::new(450.0, 320.0));
        assert_relative_eq!(before, after, epsilon = 1e-6);
    }

    #[test]
    fn dragging_cannot_leave_bounds() {
        let mut map = asuncion_map();
        let mut processor = processor();
        let bounds = GeographicBounds::asuncion().projected().unwrap();

        for _ in 0..20 {
            drag(
                &mut processor,
                &mut map,
                Point2d::new(100.0, 100.0),
                Point2d::new(700.0, 500.0),
            );
        }

        let bbox = map.view().get_bbox().unwrap();
        assert!(bounds.contains_rect(&bbox), "{bbox:?} is outside of {bounds:?}");
    }

    #[test]
    fn scroll_zooms_within_limits() {
        let mut map = asuncion_map();
        let mut processor = processor();
        let zoom = map.zoom();

        processor.handle(RawUserEvent::PointerMoved(Point2d::new(400.0, 300.0)), &mut map);
        processor.handle(RawUserEvent::Scroll(1.0), &mut map);
        assert!(map.zoom() > zoom);

        for _ in 0..100 {
            processor.handle(RawUserEvent::Scroll(1.0), &mut map);
        }
        assert_relative_eq!(map.zoom(), map.max_zoom(), epsilon = 1e-9);

        for _ in 0..200 {
            processor.handle(RawUserEvent::Scroll(-1.0), &mut map);
        }
        assert_relative_eq!(map.zoom(), map.min_zoom(), epsilon = 1e-9);
    }

    #[test]
    fn scroll_out_at_min_zoom_does_not_pan() {
        let mut map = asuncion_map();
        let mut processor = processor();
        map.set_zoom(map.min_zoom());
        let position = map.view().projected_position();

        processor.handle(RawUserEvent::PointerMoved(Point2d::new(700.0, 300.0)), &mut map);
        processor.handle(RawUserEvent::Scroll(-1.0), &mut map);

        assert_relative_eq!(map.zoom(), map.min_zoom(), epsilon = 1e-9);
        assert_relative_eq!(map.view().projected_position(), position, epsilon = 1e-6);
    }

    #[test]
    fn scroll_keeps_point_under_cursor() {
        let mut map = asuncion_map();
        let mut processor = processor();
        let cursor = Point2d::new(420.0, 310.0);
        let before = map.view().screen_to_map(cursor);

        processor.handle(RawUserEvent::PointerMoved(cursor), &mut map);
        processor.handle(RawUserEvent::Scroll(1.0), &mut map);

        let after = map.view().screen_to_map(cursor);
        assert_relative_eq!(before, after, epsilon = 1e-6);
    }
}
