//! Application configuration.
//!
//! [`AppConfig::default`] describes the Asunción heat-map page. Any part of it can be
//! overridden with a JSON document through [`AppConfig::from_json`]; missing fields keep their
//! default values.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bounds::GeographicBounds;
use crate::color::Color;
use crate::error::HeatmapError;
use crate::layer::attribution::Attribution;
use crate::side_panel::{SectionDescriptor, SectionKind, SectionPosition};
use crate::template;

const ZOOM_LIMIT: f64 = 24.0;

/// Complete configuration of the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Viewport configuration.
    pub map: MapConfig,
    /// Basemap drawn under everything else.
    pub base_tiles: TileSourceConfig,
    /// Street tiles drawn over the basemap. Hidden in the heat-map-only mode.
    pub street_tiles: TileSourceConfig,
    /// The heat-map image.
    pub overlay: OverlayConfig,
    /// Point annotations (schools).
    pub annotations: AnnotationConfig,
    /// Side panel sections.
    pub panel: PanelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            base_tiles: TileSourceConfig::openstreetmap(),
            street_tiles: TileSourceConfig::stadia_toner_lite(),
            overlay: OverlayConfig::default(),
            annotations: AnnotationConfig::default(),
            panel: PanelConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, HeatmapError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    /// Checks all the values of the configuration.
    pub fn validate(&self) -> Result<(), HeatmapError> {
        self.map.validate()?;
        self.base_tiles.validate()?;
        self.street_tiles.validate()?;
        self.overlay.validate()?;
        self.annotations.validate(&self.map)?;
        self.panel.validate()?;

        Ok(())
    }
}

/// Viewport configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Extent the viewport is kept in. Its center is the initial center of the map.
    pub bounds: GeographicBounds,
    /// Zoom level the map is opened at. Also restored by the combined view mode.
    pub initial_zoom: f64,
    /// Minimum zoom level. Also used by the heat-map-only view mode.
    pub min_zoom: f64,
    /// Maximum zoom level.
    pub max_zoom: f64,
    /// `1.0` makes the bounds rigid, lesser values allow overshooting them while dragging.
    pub bounds_viscosity: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bounds: GeographicBounds::asuncion(),
            initial_zoom: 14.0,
            min_zoom: 11.5,
            max_zoom: 19.0,
            bounds_viscosity: 1.0,
        }
    }
}

impl MapConfig {
    fn validate(&self) -> Result<(), HeatmapError> {
        self.bounds.validate()?;

        if !(0.0..=ZOOM_LIMIT).contains(&self.min_zoom)
            || !(0.0..=ZOOM_LIMIT).contains(&self.max_zoom)
            || self.min_zoom > self.max_zoom
        {
            return Err(HeatmapError::InvalidConfig(format!(
                "zoom range [{}, {}] is invalid",
                self.min_zoom, self.max_zoom
            )));
        }

        if !(self.min_zoom..=self.max_zoom).contains(&self.initial_zoom) {
            return Err(HeatmapError::InvalidConfig(format!(
                "initial zoom {} is outside of [{}, {}]",
                self.initial_zoom, self.min_zoom, self.max_zoom
            )));
        }

        if !(0.0..=1.0).contains(&self.bounds_viscosity) {
            return Err(HeatmapError::InvalidConfig(format!(
                "bounds viscosity {} must be in [0, 1]",
                self.bounds_viscosity
            )));
        }

        Ok(())
    }
}

/// Remote raster tile source.
///
/// The URL template may contain `{z}`, `{x}`, `{y}`, `{s}` (subdomain), `{r}` (retina suffix)
/// and `{ext}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSourceConfig {
    /// URL template.
    pub url_template: String,
    /// Value of the `{ext}` placeholder.
    #[serde(default = "default_ext")]
    pub ext: String,
    /// Values of the `{s}` placeholder, rotated between tiles.
    #[serde(default)]
    pub subdomains: Vec<String>,
    /// Minimum zoom level the source has tiles for.
    #[serde(default)]
    pub min_zoom: u32,
    /// Maximum zoom level the source has tiles for.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u32,
    /// Do not request tiles outside of the map bounds.
    #[serde(default)]
    pub restrict_to_bounds: bool,
    /// Credit of the tile provider.
    pub attribution: AttributionConfig,
}

fn default_ext() -> String {
    "png".to_string()
}

fn default_max_zoom() -> u32 {
    19
}

impl TileSourceConfig {
    /// Standard OpenStreetMap tiles.
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            ext: default_ext(),
            subdomains: vec![],
            min_zoom: 0,
            max_zoom: 19,
            restrict_to_bounds: false,
            attribution: AttributionConfig {
                text: "© OpenStreetMap contributors".to_string(),
                url: Some("https://www.openstreetmap.org/copyright".to_string()),
            },
        }
    }

    /// Stamen Toner Lite tiles served by Stadia Maps.
    pub fn stadia_toner_lite() -> Self {
        Self {
            url_template:
                "https://tiles.stadiamaps.com/tiles/stamen_toner_lite/{z}/{x}/{y}{r}.{ext}"
                    .to_string(),
            ext: default_ext(),
            subdomains: vec![],
            min_zoom: 0,
            max_zoom: 20,
            restrict_to_bounds: true,
            attribution: AttributionConfig {
                text: "© Stadia Maps © Stamen Design © OpenMapTiles © OpenStreetMap contributors"
                    .to_string(),
                url: Some("https://www.stadiamaps.com/".to_string()),
            },
        }
    }

    fn validate(&self) -> Result<(), HeatmapError> {
        if self.min_zoom > self.max_zoom {
            return Err(HeatmapError::InvalidConfig(format!(
                "tile zoom range [{}, {}] of {} is invalid",
                self.min_zoom, self.max_zoom, self.url_template
            )));
        }

        template::expand(
            &self.url_template,
            &[
                ("z", "0"),
                ("x", "0"),
                ("y", "0"),
                ("s", ""),
                ("r", ""),
                ("ext", &self.ext),
            ],
        )?;

        Ok(())
    }
}

/// Credit line of a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Text of the credit.
    pub text: String,
    /// Link to the provider.
    #[serde(default)]
    pub url: Option<String>,
}

impl From<&AttributionConfig> for Attribution {
    fn from(value: &AttributionConfig) -> Self {
        Attribution::new(value.text.clone(), value.url.clone())
    }
}

/// Heat-map image stretched over the map bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Location of the image.
    pub image_url: String,
    /// Opacity of the image in the combined mode.
    pub combined_opacity: f32,
    /// Opacity of the image in the heat-map-only mode.
    pub heat_only_opacity: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            image_url: "https://tania-karo.github.io/pilot2-mapa-calor-asu/imagenes/mapa-calor-asu.png"
                .to_string(),
            combined_opacity: 0.7,
            heat_only_opacity: 1.0,
        }
    }
}

impl OverlayConfig {
    fn validate(&self) -> Result<(), HeatmapError> {
        for opacity in [self.combined_opacity, self.heat_only_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(HeatmapError::InvalidConfig(format!(
                    "overlay opacity {opacity} must be in [0, 1]"
                )));
            }
        }

        Ok(())
    }
}

/// Icon of an annotation marker.
///
/// All offsets are in pixels relative to the top-left corner of the icon image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerIcon {
    /// Location of the icon image.
    pub url: String,
    /// Size the icon is drawn with.
    pub size: [f64; 2],
    /// Point of the icon placed at the feature coordinate.
    pub anchor: [f64; 2],
    /// Point the popup tip is placed at, relative to the anchor.
    pub popup_anchor: [f64; 2],
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            url: "https://tania-karo.github.io/pilot2-mapa-calor-asu/imagenes/icon-1.png"
                .to_string(),
            size: [64.0, 64.0],
            anchor: [32.0, 64.0],
            popup_anchor: [0.0, -64.0],
        }
    }
}

/// Point annotations loaded from a GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Location of the feature collection.
    pub source_url: String,
    /// Marker icon.
    pub icon: MarkerIcon,
    /// Zoom level the map is set to when a marker is clicked.
    pub feature_zoom: f64,
    /// Label of features without a name.
    pub placeholder_name: String,
    /// Body of the detail section. `{name}` is replaced with the feature name.
    pub description_template: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            source_url: "https://raw.githubusercontent.com/Tania-Karo/pilot2-mapa-calor-asu/refs/heads/main/escuelas-piloto-3.geojson".to_string(),
            icon: MarkerIcon::default(),
            feature_zoom: 18.0,
            placeholder_name: "Sin nombre".to_string(),
            description_template: "Información sobre {name}".to_string(),
        }
    }
}

impl AnnotationConfig {
    /// Detail text for the feature with the given name.
    pub fn describe(&self, name: &str) -> String {
        template::expand(&self.description_template, &[("name", name)]).unwrap_or_else(|err| {
            log::warn!("Failed to format feature description: {err}");
            name.to_string()
        })
    }

    fn validate(&self, map: &MapConfig) -> Result<(), HeatmapError> {
        if !(map.min_zoom..=map.max_zoom).contains(&self.feature_zoom) {
            return Err(HeatmapError::InvalidConfig(format!(
                "feature zoom {} is outside of [{}, {}]",
                self.feature_zoom, map.min_zoom, map.max_zoom
            )));
        }

        let [width, height] = self.icon.size;
        if !(width > 0.0 && height > 0.0) {
            return Err(HeatmapError::InvalidConfig(format!(
                "marker icon size {width}x{height} must be positive"
            )));
        }

        template::expand(&self.description_template, &[("name", "")])?;

        Ok(())
    }
}

/// Sections of the side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Section opened on start and by the combined view mode.
    pub home_section: String,
    /// Section that shows the details of a clicked feature.
    pub detail_section: String,
    /// Header colors of the active section.
    pub highlight: HeaderStyle,
    /// All sections, in the order of their headers.
    pub sections: Vec<SectionDescriptor>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            home_section: "home".to_string(),
            detail_section: "escuela".to_string(),
            highlight: HeaderStyle::default(),
            sections: vec![
                SectionDescriptor {
                    id: "home".to_string(),
                    title: "Mapa de calor de Asunción".to_string(),
                    kind: SectionKind::Pane {
                        body: "Temperatura de superficie de Asunción junto a las escuelas del \
                               programa piloto. Haga clic en un marcador para ver la escuela."
                            .to_string(),
                    },
                    position: SectionPosition::Top,
                },
                SectionDescriptor {
                    id: "escuela".to_string(),
                    title: "Escuela".to_string(),
                    kind: SectionKind::Pane {
                        body: String::new(),
                    },
                    position: SectionPosition::Top,
                },
                SectionDescriptor {
                    id: "ghlink".to_string(),
                    title: "GitHub".to_string(),
                    kind: SectionKind::Link {
                        url: "https://github.com/EsConsenso".to_string(),
                    },
                    position: SectionPosition::Bottom,
                },
            ],
        }
    }
}

impl PanelConfig {
    fn validate(&self) -> Result<(), HeatmapError> {
        let mut ids = HashSet::new();
        for section in &self.sections {
            if !ids.insert(section.id.as_str()) {
                return Err(HeatmapError::InvalidConfig(format!(
                    "duplicate panel section '{}'",
                    section.id
                )));
            }
        }

        for required in [&self.home_section, &self.detail_section] {
            let is_pane = self
                .sections
                .iter()
                .any(|s| &s.id == required && matches!(s.kind, SectionKind::Pane { .. }));
            if !is_pane {
                return Err(HeatmapError::InvalidConfig(format!(
                    "panel section '{required}' must be a pane"
                )));
            }
        }

        Ok(())
    }
}

/// Colors of a section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderStyle {
    /// Background of the header.
    pub background: Color,
    /// Text of the header.
    pub text: Color,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            background: Color::PRUSSIAN_BLUE,
            text: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.map.initial_zoom, 14.0);
        assert_eq!(config.map.min_zoom, 11.5);
        assert_eq!(config.overlay.combined_opacity, 0.7);
        assert_eq!(config.annotations.icon.anchor, [32.0, 64.0]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "map": { "initial_zoom": 13.0 } }"#).unwrap();
        assert_eq!(config.map.initial_zoom, 13.0);
        assert_eq!(config.map.min_zoom, 11.5);
        assert_eq!(config.panel, PanelConfig::default());
    }

    #[test]
    fn inverted_bounds_in_json_are_rejected() {
        let json = r#"{
            "map": {
                "bounds": {
                    "lower_left": { "lat": -24.0, "lon": -57.0 },
                    "upper_right": { "lat": -25.0, "lon": -58.0 },
                    "center": { "lat": -24.5, "lon": -57.5 }
                }
            }
        }"#;
        assert_matches!(
            AppConfig::from_json(json),
            Err(HeatmapError::InvalidBounds(_))
        );
    }

    #[test]
    fn initial_zoom_outside_range_is_rejected() {
        let mut config = AppConfig::default();
        config.map.initial_zoom = 5.0;
        assert_matches!(config.validate(), Err(HeatmapError::InvalidConfig(_)));
    }

    #[test]
    fn bad_url_template_is_rejected() {
        let mut config = AppConfig::default();
        config.street_tiles.url_template = "https://example.com/{zoom}/{x}/{y}.png".to_string();
        assert_matches!(config.validate(), Err(HeatmapError::InvalidConfig(_)));
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let mut config = AppConfig::default();
        let home = config.panel.sections[0].clone();
        config.panel.sections.push(home);
        assert_matches!(config.validate(), Err(HeatmapError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_io_error() {
        assert_matches!(AppConfig::from_json("{"), Err(HeatmapError::Io(_)));
    }

    #[test]
    fn description_uses_template() {
        let config = AnnotationConfig::default();
        assert_eq!(config.describe("Escuela Básica"), "Información sobre Escuela Básica");
    }
}
