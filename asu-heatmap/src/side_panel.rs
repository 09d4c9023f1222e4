//! State of the dockable side panel.
//!
//! The panel consists of named sections, each with a header (tab). Pane sections have a heading
//! and a text body, link sections open an external URL instead. The heading starts as the title
//! of the header and can be replaced without renaming the tab. At most one pane is active at a time
//! and only its header is highlighted. The panel can be closed independently of which pane was
//! open last.

use serde::{Deserialize, Serialize};

use crate::config::{HeaderStyle, PanelConfig};
use crate::error::HeatmapError;

/// What a section shows when opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionKind {
    /// Text content shown in the panel.
    Pane {
        /// Text of the pane.
        body: String,
    },
    /// External link opened by the application shell.
    Link {
        /// Link target.
        url: String,
    },
}

/// Group of headers the section belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionPosition {
    /// Headers at the top of the tab bar.
    #[default]
    Top,
    /// Headers at the bottom of the tab bar.
    Bottom,
}

/// Static description of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Unique key of the section.
    pub id: String,
    /// Header text.
    pub title: String,
    /// Content of the section.
    #[serde(flatten)]
    pub kind: SectionKind,
    /// Position of the header.
    #[serde(default)]
    pub position: SectionPosition,
}

/// Section registered in the panel together with its display state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSection {
    descriptor: SectionDescriptor,
    heading: Option<String>,
    visible: bool,
    highlighted: bool,
}

impl PanelSection {
    /// Unique key of the section.
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Text of the header of the section.
    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    /// Heading shown above the body of the pane. Same as the title until replaced with
    /// [`SidePanel::set_content`].
    pub fn heading(&self) -> &str {
        self.heading.as_deref().unwrap_or(&self.descriptor.title)
    }

    /// Content of the section.
    pub fn kind(&self) -> &SectionKind {
        &self.descriptor.kind
    }

    /// Body of a pane section.
    pub fn body(&self) -> Option<&str> {
        match &self.descriptor.kind {
            SectionKind::Pane { body } => Some(body),
            SectionKind::Link { .. } => None,
        }
    }

    /// Position of the header.
    pub fn position(&self) -> SectionPosition {
        self.descriptor.position
    }

    /// Whether the content of the section is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the header of the section is emphasized.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// Side panel with mutually exclusive sections.
#[derive(Debug, Clone, Default)]
pub struct SidePanel {
    sections: Vec<PanelSection>,
    active: Option<usize>,
    is_open: bool,
    highlight: HeaderStyle,
    pending_link: Option<String>,
}

impl SidePanel {
    /// Creates an empty closed panel.
    pub fn new(highlight: HeaderStyle) -> Self {
        Self {
            highlight,
            ..Default::default()
        }
    }

    /// Creates a closed panel with the configured sections.
    pub fn from_config(config: &PanelConfig) -> Result<Self, HeatmapError> {
        let mut panel = Self::new(config.highlight);
        for section in &config.sections {
            panel.add_section(section.clone())?;
        }

        Ok(panel)
    }

    /// Registers a new section. Section ids must be unique.
    pub fn add_section(&mut self, descriptor: SectionDescriptor) -> Result<(), HeatmapError> {
        if self.index_of(&descriptor.id).is_some() {
            return Err(HeatmapError::InvalidConfig(format!(
                "panel section '{}' is already registered",
                descriptor.id
            )));
        }

        self.sections.push(PanelSection {
            descriptor,
            heading: None,
            visible: false,
            highlighted: false,
        });

        Ok(())
    }

    /// Opens the panel on the given section.
    ///
    /// Opening a link section queues its URL for the shell (see [`SidePanel::take_link_request`])
    /// and keeps the current pane. Unknown ids are ignored.
    pub fn open(&mut self, id: &str) {
        let Some(index) = self.index_of(id) else {
            log::warn!("Cannot open unknown panel section '{id}'");
            return;
        };

        if let SectionKind::Link { url } = &self.sections[index].descriptor.kind {
            log::info!("Opening link section '{id}': {url}");
            self.pending_link = Some(url.clone());
            return;
        }

        self.activate(id);
        self.is_open = true;
    }

    /// Closes the panel. No section stays active.
    pub fn close(&mut self) {
        self.is_open = false;
        self.active = None;
        for section in &mut self.sections {
            section.visible = false;
            section.highlighted = false;
        }
    }

    /// Header click: opens the section, or closes the panel if the section is already open.
    pub fn toggle(&mut self, id: &str) {
        if self.is_open && self.active_section() == Some(id) {
            self.close();
        } else {
            self.open(id);
        }
    }

    /// Makes the given pane the only active one and moves the header emphasis to it.
    ///
    /// Calling it again with the same id changes nothing. Does not open a closed panel.
    pub fn activate(&mut self, id: &str) {
        let Some(index) = self.index_of(id) else {
            log::warn!("Cannot activate unknown panel section '{id}'");
            return;
        };

        if matches!(self.sections[index].descriptor.kind, SectionKind::Link { .. }) {
            log::warn!("Link section '{id}' cannot be activated");
            return;
        }

        for (i, section) in self.sections.iter_mut().enumerate() {
            section.visible = i == index;
            section.highlighted = i == index;
        }
        self.active = Some(index);
    }

    /// Replaces the heading and the body of a pane, keeping its header. Returns false if there
    /// is no such pane.
    pub fn set_content(
        &mut self,
        id: &str,
        heading: impl Into<String>,
        body: impl Into<String>,
    ) -> bool {
        let Some(index) = self.index_of(id) else {
            log::warn!("Cannot set content of unknown panel section '{id}'");
            return false;
        };

        let section = &mut self.sections[index];
        match &mut section.descriptor.kind {
            SectionKind::Pane { body: current } => {
                *current = body.into();
                section.heading = Some(heading.into());
                true
            }
            SectionKind::Link { .. } => {
                log::warn!("Cannot set content of link section '{id}'");
                false
            }
        }
    }

    /// Whether the panel is expanded.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Id of the active pane.
    pub fn active_section(&self) -> Option<&str> {
        self.active.map(|index| self.sections[index].id())
    }

    /// Whether the header of the section is emphasized.
    pub fn is_highlighted(&self, id: &str) -> bool {
        self.section(id).is_some_and(|section| section.highlighted)
    }

    /// Colors of the section header, `None` if the header is not emphasized.
    pub fn header_style(&self, id: &str) -> Option<HeaderStyle> {
        self.is_highlighted(id).then_some(self.highlight)
    }

    /// Section by its id.
    pub fn section(&self, id: &str) -> Option<&PanelSection> {
        self.index_of(id).map(|index| &self.sections[index])
    }

    /// All sections in the order of registration.
    pub fn sections(&self) -> &[PanelSection] {
        &self.sections
    }

    /// Returns the URL of the last opened link section, if it was not taken yet.
    pub fn take_link_request(&mut self) -> Option<String> {
        self.pending_link.take()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::color::Color;

    fn panel() -> SidePanel {
        SidePanel::from_config(&PanelConfig::default()).unwrap()
    }

    fn highlighted(panel: &SidePanel) -> Vec<&str> {
        panel
            .sections()
            .iter()
            .filter(|s| s.is_highlighted())
            .map(|s| s.id())
            .collect()
    }

    #[test]
    fn starts_closed() {
        let panel = panel();
        assert!(!panel.is_open());
        assert_eq!(panel.active_section(), None);
        assert!(highlighted(&panel).is_empty());
    }

    #[test]
    fn switching_moves_highlight() {
        let mut panel = panel();
        panel.open("home");
        assert_eq!(highlighted(&panel), vec!["home"]);

        panel.open("escuela");
        assert_eq!(panel.active_section(), Some("escuela"));
        assert_eq!(highlighted(&panel), vec!["escuela"]);
        assert!(!panel.section("home").unwrap().is_visible());
        assert!(panel.section("escuela").unwrap().is_visible());
    }

    #[test]
    fn activate_is_idempotent() {
        let mut panel = panel();
        panel.open("home");
        panel.activate("escuela");
        let once = panel.clone();
        panel.activate("escuela");

        assert_eq!(panel.sections(), once.sections());
        assert_eq!(highlighted(&panel), vec!["escuela"]);
    }

    #[test]
    fn header_style_only_for_active() {
        let mut panel = panel();
        panel.open("escuela");
        let style = panel.header_style("escuela").unwrap();
        assert_eq!(style.background, Color::try_from_hex("#0b3954").unwrap());
        assert_eq!(style.text, Color::WHITE);
        assert_eq!(panel.header_style("home"), None);
    }

    #[test]
    fn close_clears_active() {
        let mut panel = panel();
        panel.open("home");
        panel.close();

        assert!(!panel.is_open());
        assert_eq!(panel.active_section(), None);
        assert!(highlighted(&panel).is_empty());
    }

    #[test]
    fn link_section_queues_url() {
        let mut panel = panel();
        panel.open("home");
        panel.open("ghlink");

        assert_eq!(panel.active_section(), Some("home"));
        assert_eq!(
            panel.take_link_request().as_deref(),
            Some("https://github.com/EsConsenso")
        );
        assert_eq!(panel.take_link_request(), None);
    }

    #[test]
    fn unknown_section_is_ignored() {
        let mut panel = panel();
        panel.open("home");
        panel.open("nope");
        panel.activate("nope");

        assert_eq!(panel.active_section(), Some("home"));
        assert!(!panel.set_content("nope", "a", "b"));
    }

    #[test]
    fn set_content_replaces_pane_text() {
        let mut panel = panel();
        assert!(panel.set_content("escuela", "Escuela 1", "Información sobre Escuela 1"));
        let section = panel.section("escuela").unwrap();
        assert_eq!(section.heading(), "Escuela 1");
        assert_eq!(section.title(), "Escuela");
        assert_eq!(section.body(), Some("Información sobre Escuela 1"));

        assert!(!panel.set_content("ghlink", "x", "y"));
    }

    #[test]
    fn toggle_closes_open_section() {
        let mut panel = panel();
        panel.toggle("home");
        assert!(panel.is_open());
        panel.toggle("home");
        assert!(!panel.is_open());
        panel.toggle("home");
        panel.toggle("escuela");
        assert_eq!(panel.active_section(), Some("escuela"));
    }

    #[test]
    fn duplicate_section_is_rejected() {
        let mut panel = panel();
        let result = panel.add_section(SectionDescriptor {
            id: "home".into(),
            title: "Home".into(),
            kind: SectionKind::Pane { body: "".into() },
            position: SectionPosition::Top,
        });
        assert_matches!(result, Err(HeatmapError::InvalidConfig(_)));
    }

    #[test]
    fn descriptor_json_format() {
        let json = r#"{ "id": "ghlink", "title": "GitHub", "type": "link", "url": "https://github.com/EsConsenso", "position": "bottom" }"#;
        let descriptor: SectionDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(
            descriptor.kind,
            SectionKind::Link {
                url: "https://github.com/EsConsenso".into()
            }
        );
        assert_eq!(descriptor.position, SectionPosition::Bottom);
    }
}
