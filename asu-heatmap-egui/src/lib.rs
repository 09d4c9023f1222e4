//! Egui window of the Asunción heat-map viewer.
//!
//! [`EguiMap`] shows the map of an [`AppState`](asu_heatmap::AppState) in an egui `Ui` and
//! [`SidePanelView`] shows its side panel. With the `init` feature (enabled by default)
//! [`InitBuilder`] starts the complete viewer as a native window or a web app.

mod egui_map;
mod image_store;
mod side_panel;

pub use egui_map::{EguiMap, MapStateMessenger};
pub use image_store::ImageStore;
pub use side_panel::SidePanelView;

#[cfg(feature = "init")]
mod app;
#[cfg(feature = "init")]
mod init;
#[cfg(feature = "init")]
pub use app::HeatmapApp;
#[cfg(feature = "init")]
pub use init::InitBuilder;
