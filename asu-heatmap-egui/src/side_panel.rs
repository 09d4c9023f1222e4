use asu_heatmap::config::HeaderStyle;
use asu_heatmap::side_panel::{PanelSection, SectionKind, SectionPosition, SidePanel};
use asu_heatmap::{AppState, Color};
use egui::{Align, Button, Color32, Layout, RichText, Ui};

const OPEN_WIDTH: f32 = 340.0;
const CLOSED_WIDTH: f32 = 56.0;

enum PanelAction {
    Toggle(String),
    Close,
}

/// Side panel with a tab header for every section and the content of the active one.
pub struct SidePanelView<'a> {
    state: &'a mut AppState,
}

impl<'a> SidePanelView<'a> {
    /// Creates the view of the panel of the state.
    pub fn new(state: &'a mut AppState) -> Self {
        Self { state }
    }

    /// Shows the panel on the left side of the window.
    pub fn show(self, ctx: &egui::Context) {
        let panel = self.state.panel().read().clone();
        let width = if panel.is_open() {
            OPEN_WIDTH
        } else {
            CLOSED_WIDTH
        };

        let mut action = None;
        egui::SidePanel::left("side_panel")
            .resizable(false)
            .exact_width(width)
            .show(ctx, |ui| {
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| tabs(ui, &panel, &mut action));

                    if let Some(section) = panel
                        .is_open()
                        .then(|| panel.active_section())
                        .flatten()
                        .and_then(|id| panel.section(id))
                    {
                        ui.separator();
                        ui.vertical(|ui| content(ui, section, &mut action));
                    }
                });
            });

        match action {
            Some(PanelAction::Toggle(id)) => self.state.toggle_section(&id),
            Some(PanelAction::Close) => self.state.close_panel(),
            None => {}
        }

        if let Some(url) = self.state.take_link_request() {
            ctx.open_url(egui::OpenUrl::new_tab(url));
        }
    }
}

fn tabs(ui: &mut Ui, panel: &SidePanel, action: &mut Option<PanelAction>) {
    let (top, bottom): (Vec<&PanelSection>, Vec<&PanelSection>) = panel
        .sections()
        .iter()
        .partition(|section| section.position() == SectionPosition::Top);

    for section in top {
        tab(ui, panel, section, action);
    }

    ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
        for section in bottom.into_iter().rev() {
            tab(ui, panel, section, action);
        }
    });
}

fn tab(ui: &mut Ui, panel: &SidePanel, section: &PanelSection, action: &mut Option<PanelAction>) {
    let label = match section.kind() {
        SectionKind::Link { .. } => format!("{} ↗", section.title()),
        SectionKind::Pane { .. } => section.title().to_string(),
    };

    let button = match panel.header_style(section.id()) {
        Some(HeaderStyle { background, text }) => {
            Button::new(RichText::new(label).color(to_color32(text))).fill(to_color32(background))
        }
        None => Button::new(label),
    };

    if ui.add(button).clicked() {
        *action = Some(PanelAction::Toggle(section.id().to_string()));
    }
}

fn content(ui: &mut Ui, section: &PanelSection, action: &mut Option<PanelAction>) {
    ui.horizontal(|ui| {
        ui.heading(section.heading());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.button("✕").clicked() {
                *action = Some(PanelAction::Close);
            }
        });
    });
    ui.separator();

    if let Some(body) = section.body() {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.label(body);
        });
    }
}

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}
