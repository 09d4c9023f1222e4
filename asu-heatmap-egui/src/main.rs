//! Mapa de calor de Asunción.

use asu_heatmap::AppConfig;
use asu_heatmap_egui::InitBuilder;

fn main() -> eframe::Result {
    InitBuilder::new(AppConfig::default()).init()
}
