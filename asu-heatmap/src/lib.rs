//! Map engine of the Asunción heat-map viewer.
//!
//! The viewer shows a static heat-map image of Asunción over street tiles, with a marker for every
//! school. Clicking a marker shows the school in a side panel and flies the map to it, and two
//! view modes switch between the heat map alone and the combined picture.
//!
//! # Main components
//!
//! * [`Map`] contains the currently displayed [`MapView`], its limits (zoom range and
//!   [`bounds`](bounds::MaxBounds) the view is kept in), animation state and a set of
//! * [`layers`](layer) that know what to draw: [tiles](layer::RasterTileLayer), the
//!   [heat-map image](layer::ImageOverlay) and the [markers](layer::AnnotationLayer). Layers draw
//!   to a [`Canvas`](render::Canvas) provided by the UI toolkit.
//! * [`SidePanel`](side_panel::SidePanel) holds the sections of the panel next to the map and
//!   which one of them is active.
//! * [`ViewModeController`](view_mode::ViewModeController) switches between the view modes.
//! * [`EventProcessor`](control::EventProcessor) converts raw input into clicks and drags, which
//!   the [`controls`](control) turn into changes of the map.
//!
//! [`AppState`] owns all of the above and is the only object a UI shell needs:
//!
//! ```no_run
//! use asu_heatmap::data_source::UrlFeatureSource;
//! use asu_heatmap::{AppConfig, AppState};
//!
//! # tokio_test::block_on(async {
//! let config = AppConfig::default();
//! let source = UrlFeatureSource::new(config.annotations.source_url.clone());
//!
//! let mut state = AppState::initialize(config).expect("valid configuration");
//! state.spawn_annotation_load(source);
//!
//! // every frame
//! state.poll_annotations();
//! state.animate();
//! # });
//! ```

pub mod async_runtime;
pub mod bounds;
mod color;
pub mod config;
pub mod control;
pub mod data_source;
pub mod decoded_image;
pub mod error;
pub mod layer;
mod lod;
mod map;
mod messenger;
pub mod platform;
pub mod render;
pub mod side_panel;
mod template;
pub mod tile_schema;
mod view;
pub mod view_mode;

mod app;

pub use app::AppState;
pub use color::Color;
pub use config::AppConfig;
pub use lod::Lod;
pub use map::{LayerCollection, LayerId, Map, MapBuilder, PAN_DURATION};
pub use messenger::Messenger;
pub use tile_schema::TileSchema;
pub use view::{resolution_to_zoom, zoom_to_resolution, MapView};

pub use asu_heatmap_types;
