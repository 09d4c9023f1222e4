//! Switching between the heat-map-only and the combined presentation of the map.

use asu_heatmap_types::geo::GeoPoint2d;
use parking_lot::RwLock;

use crate::config::OverlayConfig;
use crate::layer::ImageOverlay;
use crate::map::{LayerId, Map};
use crate::side_panel::SidePanel;

/// Presentation mode of the map.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Only the heat-map image over the base tiles.
    HeatOnly,
    /// Heat map, street tiles and annotations together.
    #[default]
    Combined,
}

/// Layers and framing the view modes operate on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewModeTargets {
    /// Street tile layer, hidden in the heat-map-only mode.
    pub street: LayerId,
    /// The heat-map image.
    pub overlay: LayerId,
    /// Center restored by the combined mode.
    pub center: GeoPoint2d,
    /// Zoom level restored by the combined mode.
    pub zoom: f64,
}

/// Two-state toggle between [`ViewMode::HeatOnly`] and [`ViewMode::Combined`].
///
/// The controller does not own the map or the panel, they are given to every transition. Until
/// the layers are registered with [`ViewModeController::register_layers`] transitions do nothing.
#[derive(Debug, Clone)]
pub struct ViewModeController {
    mode: ViewMode,
    targets: Option<ViewModeTargets>,
    annotations: Option<LayerId>,
    heat_only_opacity: f32,
    combined_opacity: f32,
    home_section: String,
}

impl ViewModeController {
    /// Creates a controller in the combined mode with no registered layers.
    pub fn new(overlay: &OverlayConfig, home_section: impl Into<String>) -> Self {
        Self {
            mode: ViewMode::Combined,
            targets: None,
            annotations: None,
            heat_only_opacity: overlay.heat_only_opacity,
            combined_opacity: overlay.combined_opacity,
            home_section: home_section.into(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Returns true once the layers are registered.
    pub fn is_registered(&self) -> bool {
        self.targets.is_some()
    }

    /// Sets the layers and the framing the transitions operate on.
    pub fn register_layers(&mut self, targets: ViewModeTargets) {
        self.targets = Some(targets);
    }

    /// Sets the annotation layer. In the heat-map-only mode the layer is detached right away.
    pub fn register_annotations(&mut self, map: &mut Map, id: LayerId) {
        self.annotations = Some(id);
        if self.mode == ViewMode::HeatOnly {
            map.detach_layer(id);
        }
    }

    /// Shows only the heat map: full opacity, no street tiles and annotations, the widest zoom
    /// and a closed panel.
    pub fn show_heat_only(&mut self, map: &mut Map, panel: &RwLock<SidePanel>) {
        let Some(targets) = self.targets else {
            log::debug!("Heat-map-only mode requested before the map layers are ready");
            return;
        };

        set_overlay_opacity(map, targets.overlay, self.heat_only_opacity);
        map.detach_layer(targets.street);
        if let Some(annotations) = self.annotations {
            map.detach_layer(annotations);
        }

        map.set_zoom(map.effective_min_zoom());
        panel.write().close();

        self.mode = ViewMode::HeatOnly;
        log::debug!("Switched to heat-map-only mode");
    }

    /// Shows everything: street tiles and annotations, translucent heat map, the initial framing
    /// and the home section of the panel.
    pub fn show_combined(&mut self, map: &mut Map, panel: &RwLock<SidePanel>) {
        let Some(targets) = self.targets else {
            log::debug!("Combined mode requested before the map layers are ready");
            return;
        };

        map.attach_layer(targets.street);
        if let Some(annotations) = self.annotations {
            map.attach_layer(annotations);
        }
        set_overlay_opacity(map, targets.overlay, self.combined_opacity);

        map.pan_to(&targets.center, targets.zoom, false);
        panel.write().open(&self.home_section);

        self.mode = ViewMode::Combined;
        log::debug!("Switched to combined mode");
    }
}

fn set_overlay_opacity(map: &mut Map, id: LayerId, opacity: f32) {
    match map.layers_mut().get_as_mut::<ImageOverlay>(id) {
        Some(overlay) => overlay.set_opacity(opacity),
        None => log::warn!("Layer {id:?} is not an image overlay"),
    }

    map.redraw();
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use asu_heatmap_types::geo::GeoPoint;

    use super::*;
    use crate::bounds::GeographicBounds;
    use crate::config::{MapConfig, PanelConfig};
    use crate::layer::tests::TestLayer;
    use crate::map::MapBuilder;

    struct Fixture {
        map: Map,
        panel: RwLock<SidePanel>,
        targets: ViewModeTargets,
    }

    fn fixture() -> Fixture {
        let config = MapConfig::default();
        let mut map = MapBuilder::from_config(&config).unwrap().build();
        let bounds = GeographicBounds::asuncion();

        map.add_layer(TestLayer("base"));
        let street = map.add_layer(TestLayer("street"));
        let overlay = map.add_layer(
            ImageOverlay::new("heat.png", bounds, OverlayConfig::default().combined_opacity)
                .unwrap(),
        );

        let mut panel = SidePanel::from_config(&PanelConfig::default()).unwrap();
        panel.open("home");

        Fixture {
            map,
            panel: RwLock::new(panel),
            targets: ViewModeTargets {
                street,
                overlay,
                center: bounds.center(),
                zoom: config.initial_zoom,
            },
        }
    }

    fn overlay_opacity(map: &Map, id: LayerId) -> f32 {
        map.layers().get_as::<ImageOverlay>(id).unwrap().opacity()
    }

    #[test]
    fn heat_only_then_combined_restores_state() {
        let Fixture {
            mut map,
            panel,
            targets,
        } = fixture();
        let annotations = map.add_layer(TestLayer("annotations"));

        let mut controller = ViewModeController::new(&OverlayConfig::default(), "home");
        controller.register_layers(targets);
        controller.register_annotations(&mut map, annotations);

        controller.show_heat_only(&mut map, &panel);
        assert_eq!(controller.mode(), ViewMode::HeatOnly);
        assert_relative_eq!(overlay_opacity(&map, targets.overlay), 1.0);
        assert!(!map.is_attached(targets.street));
        assert!(!map.is_attached(annotations));
        assert_relative_eq!(map.zoom(), map.min_zoom(), epsilon = 1e-9);
        assert!(!panel.read().is_open());

        controller.show_combined(&mut map, &panel);
        assert_eq!(controller.mode(), ViewMode::Combined);
        assert_relative_eq!(overlay_opacity(&map, targets.overlay), 0.7);
        assert!(map.is_attached(targets.street));
        assert!(map.is_attached(annotations));
        assert_relative_eq!(map.zoom(), targets.zoom, epsilon = 1e-9);
        let center = map.center().unwrap();
        assert_relative_eq!(center.lat(), targets.center.lat(), epsilon = 1e-9);
        assert_relative_eq!(center.lon(), targets.center.lon(), epsilon = 1e-9);
        assert!(panel.read().is_open());
        assert_eq!(panel.read().active_section(), Some("home"));
    }

    #[test]
    fn transitions_before_registration_are_ignored() {
        let Fixture {
            mut map, panel, ..
        } = fixture();
        let zoom = map.zoom();

        let mut controller = ViewModeController::new(&OverlayConfig::default(), "home");
        controller.show_heat_only(&mut map, &panel);

        assert_eq!(controller.mode(), ViewMode::Combined);
        assert_relative_eq!(map.zoom(), zoom);
        assert!(panel.read().is_open());
        assert_eq!(map.layers().iter_visible().count(), 3);
    }

    #[test]
    fn annotations_arriving_in_heat_only_mode_stay_hidden() {
        let Fixture {
            mut map,
            panel,
            targets,
        } = fixture();

        let mut controller = ViewModeController::new(&OverlayConfig::default(), "home");
        controller.register_layers(targets);
        controller.show_heat_only(&mut map, &panel);

        let annotations = map.add_layer(TestLayer("annotations"));
        controller.register_annotations(&mut map, annotations);
        assert!(!map.is_attached(annotations));

        controller.show_combined(&mut map, &panel);
        assert!(map.is_attached(annotations));
    }

    #[test]
    fn repeated_transitions_are_stable() {
        let Fixture {
            mut map,
            panel,
            targets,
        } = fixture();

        let mut controller = ViewModeController::new(&OverlayConfig::default(), "home");
        controller.register_layers(targets);
        controller.show_heat_only(&mut map, &panel);
        controller.show_heat_only(&mut map, &panel);
        assert!(!map.is_attached(targets.street));

        controller.show_combined(&mut map, &panel);
        controller.show_combined(&mut map, &panel);
        assert!(map.is_attached(targets.street));
        assert_relative_eq!(overlay_opacity(&map, targets.overlay), 0.7);
    }
}
