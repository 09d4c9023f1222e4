//! State of the whole viewer: the map, the side panel, the view modes and the input handling.

use std::future::Future;
use std::sync::Arc;

use asu_heatmap_types::cartesian::Size;
use futures::channel::oneshot;
use maybe_sync::MaybeSend;
use parking_lot::RwLock;

use crate::async_runtime;
use crate::config::AppConfig;
use crate::control::{AnnotationClickHandler, EventProcessor, MapController, RawUserEvent};
use crate::data_source::{Feature, FeatureSource};
use crate::error::{FetchError, HeatmapError};
use crate::layer::attribution::Attribution;
use crate::layer::{AnnotationLayer, ImageOverlay, RasterTileLayerBuilder};
use crate::map::{LayerId, Map, MapBuilder};
use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::side_panel::SidePanel;
use crate::view_mode::{ViewMode, ViewModeController, ViewModeTargets};

type AnnotationsResult = Result<Vec<Feature>, FetchError>;

/// The application state. This is the only object the UI shell talks to.
///
/// All state is mutated from the UI thread. The only background work is loading of the
/// annotations, whose result is delivered through a channel and installed by
/// [`AppState::poll_annotations`].
pub struct AppState {
    config: AppConfig,
    map: Map,
    panel: Arc<RwLock<SidePanel>>,
    view_mode: ViewModeController,
    events: EventProcessor,
    annotations: Option<LayerId>,
    pending_annotations: Option<oneshot::Receiver<AnnotationsResult>>,
}

impl AppState {
    /// Validates the configuration and builds the map with its layers (base tiles, street tiles,
    /// the heat-map image) and the side panel opened on the home section.
    pub fn initialize(config: AppConfig) -> Result<Self, HeatmapError> {
        config.validate()?;
        let bounds = config.map.bounds;

        let base_layer = RasterTileLayerBuilder::from_config(&config.base_tiles, &bounds)?.build()?;
        let street_layer =
            RasterTileLayerBuilder::from_config(&config.street_tiles, &bounds)?.build()?;
        let overlay = ImageOverlay::new(
            config.overlay.image_url.clone(),
            bounds,
            config.overlay.combined_opacity,
        )?;

        let mut map = MapBuilder::from_config(&config.map)?.build();
        map.add_layer(base_layer);
        let street = map.add_layer(street_layer);
        let overlay = map.add_layer(overlay);

        let mut panel = SidePanel::from_config(&config.panel)?;
        panel.open(&config.panel.home_section);

        let mut view_mode = ViewModeController::new(&config.overlay, &config.panel.home_section);
        view_mode.register_layers(ViewModeTargets {
            street,
            overlay,
            center: bounds.center(),
            zoom: config.map.initial_zoom,
        });

        let mut events = EventProcessor::default();
        events.add_handler(AnnotationClickHandler::new(config.annotations.feature_zoom));
        events.add_handler(MapController::default());

        log::info!("Map initialized at {:?}", bounds.center());

        Ok(Self {
            config,
            map,
            panel: Arc::new(RwLock::new(panel)),
            view_mode,
            events,
            annotations: None,
            pending_annotations: None,
        })
    }

    /// Configuration the state was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns a future loading the features from the source. The result is installed by the
    /// next [`AppState::poll_annotations`] call after the future completes.
    ///
    /// Starting a new load discards the result of the previous one. If the state is dropped
    /// before the future completes, the result is discarded.
    pub fn load_annotations<S>(
        &mut self,
        source: S,
    ) -> impl Future<Output = ()> + MaybeSend + 'static
    where
        S: FeatureSource + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.pending_annotations = Some(receiver);

        async move {
            let result = source.load().await;
            if sender.send(result).is_err() {
                log::debug!("Annotations were loaded after the map was gone, result is discarded");
            }
        }
    }

    /// Starts loading of the features in the background.
    ///
    /// Natively this must be called inside a tokio runtime.
    pub fn spawn_annotation_load(&mut self, source: impl FeatureSource + 'static) {
        async_runtime::spawn(self.load_annotations(source));
    }

    /// Returns true while a started load has not delivered its result yet.
    pub fn is_loading_annotations(&self) -> bool {
        self.pending_annotations.is_some()
    }

    /// Installs the result of the annotation load if it arrived. Returns true if the annotation
    /// layer was changed.
    pub fn poll_annotations(&mut self) -> bool {
        let Some(receiver) = &mut self.pending_annotations else {
            return false;
        };

        match receiver.try_recv() {
            Ok(Some(result)) => {
                self.pending_annotations = None;
                self.install_annotations(result)
            }
            Ok(None) => false,
            Err(oneshot::Canceled) => {
                log::warn!("Annotation load was dropped before completion");
                self.pending_annotations = None;
                false
            }
        }
    }

    /// Replaces the annotation layer with markers for the features. A failed load is logged and
    /// leaves the map without markers.
    pub fn install_annotations(&mut self, result: AnnotationsResult) -> bool {
        let features = match result {
            Ok(features) => features,
            Err(err) => {
                log::error!("Failed to load annotations: {err}");
                return false;
            }
        };

        if let Some(previous) = self.annotations.take() {
            self.map.remove_layer(previous);
        }

        let layer = AnnotationLayer::build(
            features,
            &self.config.annotations,
            self.config.panel.detail_section.clone(),
            Arc::downgrade(&self.panel),
        );
        log::info!("Showing {} annotations", layer.len());

        let id = self.map.add_layer(layer);
        self.view_mode.register_annotations(&mut self.map, id);
        self.annotations = Some(id);

        true
    }

    /// Number of markers on the map.
    pub fn annotation_count(&self) -> usize {
        self.annotation_layer().map_or(0, AnnotationLayer::len)
    }

    /// The annotation layer, once the features are loaded.
    pub fn annotation_layer(&self) -> Option<&AnnotationLayer> {
        self.annotations
            .and_then(|id| self.map.layers().get_as::<AnnotationLayer>(id))
    }

    /// Processes a user input event.
    pub fn handle_event(&mut self, event: RawUserEvent) {
        self.events.handle(event, &mut self.map);
    }

    /// Switches to the heat-map-only mode.
    pub fn show_heat_only(&mut self) {
        self.view_mode.show_heat_only(&mut self.map, &self.panel);
    }

    /// Switches to the combined mode.
    pub fn show_combined(&mut self) {
        self.view_mode.show_combined(&mut self.map, &self.panel);
    }

    /// Current view mode.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode.mode()
    }

    /// Opens the panel on the section.
    pub fn open_section(&mut self, id: &str) {
        self.panel.write().open(id);
        self.map.redraw();
    }

    /// Header click: opens the section, or closes the panel if the section is already open.
    pub fn toggle_section(&mut self, id: &str) {
        self.panel.write().toggle(id);
        self.map.redraw();
    }

    /// Closes the side panel.
    pub fn close_panel(&mut self) {
        self.panel.write().close();
        self.map.redraw();
    }

    /// URL of a link section the user opened, to be opened by the shell.
    pub fn take_link_request(&mut self) -> Option<String> {
        self.panel.write().take_link_request()
    }

    /// The side panel.
    pub fn panel(&self) -> &Arc<RwLock<SidePanel>> {
        &self.panel
    }

    /// The map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The map.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Attributions of the visible layers.
    pub fn attributions(&self) -> Vec<Attribution> {
        self.map.attributions()
    }

    /// Sets the messenger used to request redraws.
    pub fn set_messenger(&mut self, messenger: impl Messenger + 'static) {
        self.map.set_messenger(Some(messenger));
    }

    /// Sets the size of the map area in pixels.
    pub fn set_size(&mut self, size: Size) {
        self.map.set_size(size);
    }

    /// Advances the view animation. Should be called before every frame.
    pub fn animate(&mut self) {
        self.map.animate();
    }

    /// Draws the map.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.map.render(canvas);
    }
}
