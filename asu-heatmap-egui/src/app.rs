use std::time::Duration;

use asu_heatmap::AppState;

use crate::egui_map::EguiMap;
use crate::image_store::ImageStore;
use crate::side_panel::SidePanelView;

const HEAT_ONLY_LABEL: &str = "Ver mapa calor";
const COMBINED_LABEL: &str = "Ver mapa combinado";
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The viewer window: view mode buttons on top, the side panel on the left and the map.
pub struct HeatmapApp {
    state: AppState,
    images: ImageStore,
}

impl HeatmapApp {
    /// Creates the window content for the state.
    pub fn new(state: AppState, images: ImageStore) -> Self {
        Self { state, images }
    }
}

impl eframe::App for HeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll_annotations() {
            ctx.request_repaint();
        }
        if self.state.is_loading_annotations() {
            ctx.request_repaint_after(LOAD_POLL_INTERVAL);
        }

        egui::TopBottomPanel::top("view_modes").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(HEAT_ONLY_LABEL).clicked() {
                    self.state.show_heat_only();
                }
                if ui.button(COMBINED_LABEL).clicked() {
                    self.state.show_combined();
                }
            });
        });

        SidePanelView::new(&mut self.state).show(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                EguiMap::new(&mut self.state, &self.images).show_ui(ui);
            });
    }
}
