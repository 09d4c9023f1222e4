//! Markers of the point features, with popups and a link to the side panel.

use std::any::Any;
use std::sync::Weak;

use asu_heatmap_types::cartesian::{Point2d, Rect};
use asu_heatmap_types::geo::{GeoPoint2d, Projection, WebMercator};
use parking_lot::RwLock;

use crate::config::AnnotationConfig;
use crate::data_source::{Feature, FeatureId};
use crate::layer::Layer;
use crate::render::Canvas;
use crate::side_panel::SidePanel;
use crate::view::MapView;

#[derive(Debug, Clone)]
struct Marker {
    feature: Feature,
    projected: Point2d,
}

/// Layer that draws an icon for every feature.
///
/// Activating a marker (see [`AnnotationLayer::activate`]) opens its popup and shows the feature
/// in the detail section of the side panel. The layer only holds a weak reference to the panel,
/// so it never keeps the panel alive.
pub struct AnnotationLayer {
    markers: Vec<Marker>,
    config: AnnotationConfig,
    detail_section: String,
    panel: Weak<RwLock<SidePanel>>,
    popup: Option<usize>,
}

impl std::fmt::Debug for AnnotationLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationLayer")
            .field("markers", &self.markers.len())
            .field("detail_section", &self.detail_section)
            .field("popup", &self.popup)
            .finish()
    }
}

impl AnnotationLayer {
    /// Creates a marker for every feature. Features that cannot be placed on the map are
    /// skipped.
    pub fn build(
        features: Vec<Feature>,
        config: &AnnotationConfig,
        detail_section: impl Into<String>,
        panel: Weak<RwLock<SidePanel>>,
    ) -> Self {
        let projection = WebMercator::default();
        let markers = features
            .into_iter()
            .filter_map(|feature| match projection.project(&feature.position()) {
                Some(projected) => Some(Marker { feature, projected }),
                None => {
                    log::warn!(
                        "Feature {:?} at {:?} cannot be shown on the map",
                        feature.id(),
                        feature.position()
                    );
                    None
                }
            })
            .collect();

        Self {
            markers,
            config: config.clone(),
            detail_section: detail_section.into(),
            panel,
            popup: None,
        }
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if the layer has no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Features of the markers, in drawing order.
    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.markers.iter().map(|marker| &marker.feature)
    }

    /// Feature by its id.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.marker_index(id).map(|index| &self.markers[index].feature)
    }

    /// Name shown for the feature.
    pub fn label<'a>(&'a self, feature: &'a Feature) -> &'a str {
        feature.display_name(&self.config.placeholder_name)
    }

    /// Screen rectangle of the marker icon.
    fn icon_rect(&self, view: &MapView, marker: &Marker) -> Rect {
        let icon = &self.config.icon;
        let anchor = view.map_to_screen(&marker.projected);
        let x_min = anchor.x - icon.anchor[0];
        let y_min = anchor.y - icon.anchor[1];

        Rect::new(x_min, y_min, x_min + icon.size[0], y_min + icon.size[1])
    }

    /// The feature whose icon is under the screen point. Markers drawn later are on top.
    pub fn marker_at(&self, view: &MapView, screen_point: Point2d) -> Option<FeatureId> {
        self.markers
            .iter()
            .rev()
            .find(|marker| self.icon_rect(view, marker).contains(&screen_point))
            .map(|marker| marker.feature.id())
    }

    /// Feature whose popup is open.
    pub fn popup(&self) -> Option<FeatureId> {
        self.popup.map(|index| self.markers[index].feature.id())
    }

    /// Opens the popup of the feature, closing any other. Returns false if there is no such
    /// feature.
    pub fn open_popup(&mut self, id: FeatureId) -> bool {
        match self.marker_index(id) {
            Some(index) => {
                self.popup = Some(index);
                true
            }
            None => false,
        }
    }

    /// Closes the open popup.
    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Marker click: opens the popup of the feature, shows the feature in the detail section
    /// of the panel and opens the panel on that section.
    ///
    /// Returns the position of the feature for the caller to center the map on, or `None` if
    /// there is no such feature.
    pub fn activate(&mut self, id: FeatureId) -> Option<GeoPoint2d> {
        let index = self.marker_index(id)?;
        self.popup = Some(index);

        let feature = &self.markers[index].feature;
        let name = self.label(feature);
        log::debug!("Feature {id:?} '{name}' activated");

        match self.panel.upgrade() {
            Some(panel) => {
                let mut panel = panel.write();
                panel.set_content(&self.detail_section, name, self.config.describe(name));
                panel.open(&self.detail_section);
            }
            None => log::debug!("Side panel is gone, feature {id:?} is not shown in it"),
        }

        Some(feature.position())
    }

    fn marker_index(&self, id: FeatureId) -> Option<usize> {
        self.markers
            .iter()
            .position(|marker| marker.feature.id() == id)
    }
}

impl Layer for AnnotationLayer {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        let visible = view.get_bbox().map(|_| {
            Rect::new(0.0, 0.0, view.size().width(), view.size().height())
        });

        for marker in &self.markers {
            let rect = self.icon_rect(view, marker);
            if visible.is_some_and(|screen| !screen.intersects(&rect)) {
                continue;
            }

            canvas.draw_image(&self.config.icon.url, rect, 1.0);
        }

        if let Some(index) = self.popup {
            let marker = &self.markers[index];
            let anchor = view.map_to_screen(&marker.projected);
            let tip = Point2d::new(
                anchor.x + self.config.icon.popup_anchor[0],
                anchor.y + self.config.icon.popup_anchor[1],
            );
            canvas.draw_popup(tip, self.label(&marker.feature));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
