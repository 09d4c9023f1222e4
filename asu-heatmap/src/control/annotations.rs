use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::layer::AnnotationLayer;
use crate::map::Map;

/// Handles clicks on the markers of the [`AnnotationLayer`]s of the map.
///
/// A click on a marker activates its feature and flies the map to it at the feature zoom. A click
/// anywhere else closes open popups and lets the event through. Only attached layers react.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnnotationClickHandler {
    feature_zoom: f64,
}

impl AnnotationClickHandler {
    /// Creates a handler that zooms to `feature_zoom` on marker clicks.
    pub fn new(feature_zoom: f64) -> Self {
        Self { feature_zoom }
    }

    /// Zoom level the map is set to when a marker is clicked.
    pub fn feature_zoom(&self) -> f64 {
        self.feature_zoom
    }
}

impl UserEventHandler for AnnotationClickHandler {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::Click(MouseButton::Left, mouse_event) => {
                let view = *map.view();
                let point = mouse_event.screen_pointer_position;

                let mut hit = false;
                let mut target = None;
                let mut popup_closed = false;
                for (_, layer) in map.layers_mut().iter_visible_mut_rev() {
                    let Some(annotations) = layer.as_any_mut().downcast_mut::<AnnotationLayer>()
                    else {
                        continue;
                    };

                    if !hit {
                        if let Some(id) = annotations.marker_at(&view, point) {
                            hit = true;
                            target = annotations.activate(id);
                            continue;
                        }
                    }

                    if annotations.popup().is_some() {
                        annotations.close_popup();
                        popup_closed = true;
                    }
                }

                if let Some(position) = target {
                    map.pan_to(&position, self.feature_zoom, true);
                }

                if hit || popup_closed {
                    map.redraw();
                }

                if hit {
                    EventPropagation::Stop
                } else {
                    EventPropagation::Propagate
                }
            }
            UserEvent::DoubleClick(MouseButton::Left, mouse_event) => {
                let view = *map.view();
                let on_marker = map.layers().iter_visible().any(|layer| {
                    layer
                        .as_any()
                        .downcast_ref::<AnnotationLayer>()
                        .and_then(|annotations| {
                            annotations.marker_at(&view, mouse_event.screen_pointer_position)
                        })
                        .is_some()
                });

                if on_marker {
                    EventPropagation::Stop
                } else {
                    EventPropagation::Propagate
                }
            }
            _ => EventPropagation::Propagate,
        }
    }
}
