use asu_heatmap::data_source::UrlFeatureSource;
use asu_heatmap::{AppConfig, AppState};
use eframe::AppCreator;

use crate::app::HeatmapApp;
use crate::egui_map::MapStateMessenger;
use crate::image_store::ImageStore;

const APP_NAME: &str = "Mapa de calor de Asunción";

/// Starts the viewer window on the current platform.
///
/// Natively a tokio runtime for the background loading is started and the log is written to
/// stderr (`RUST_LOG` controls the level, `info` by default). On the web the log goes to the
/// browser console and the app is mounted to the canvas with the id `the_canvas_id`.
pub struct InitBuilder {
    config: AppConfig,
    #[cfg(not(target_arch = "wasm32"))]
    native_options: Option<eframe::NativeOptions>,
    #[cfg(target_arch = "wasm32")]
    web_options: Option<eframe::WebOptions>,
}

impl InitBuilder {
    /// Creates a builder for the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            #[cfg(not(target_arch = "wasm32"))]
            native_options: None,
            #[cfg(target_arch = "wasm32")]
            web_options: None,
        }
    }

    /// Sets eframe options of the native window.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Sets eframe options of the web app.
    #[cfg(target_arch = "wasm32")]
    pub fn with_web_options(mut self, options: eframe::WebOptions) -> Self {
        self.web_options = Some(options);
        self
    }

    /// Runs the app. Natively blocks until the window is closed.
    pub fn init(self) -> eframe::Result {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.init_not_wasm()
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.init_wasm()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn init_not_wasm(self) -> eframe::Result {
        use std::time::Duration;

        use tokio::runtime::Runtime;

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let rt = Runtime::new().map_err(|err| eframe::Error::AppCreation(Box::new(err)))?;
        let _enter = rt.enter();

        std::thread::spawn(move || {
            rt.block_on(async {
                loop {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            })
        });

        let native_options = self.native_options.unwrap_or_default();
        let app_creator: AppCreator<'static> = app_creator(self.config);

        eframe::run_native(APP_NAME, native_options, app_creator)
    }

    #[cfg(target_arch = "wasm32")]
    fn init_wasm(self) -> eframe::Result {
        use eframe::wasm_bindgen::JsCast as _;

        eframe::WebLogger::init(log::LevelFilter::Info).ok();

        let web_options = self.web_options.unwrap_or_default();
        let config = self.config;

        wasm_bindgen_futures::spawn_local(async move {
            let Some(document) = web_sys::window().and_then(|window| window.document()) else {
                log::error!("No document to mount the app to");
                return;
            };

            let Some(canvas) = document
                .get_element_by_id("the_canvas_id")
                .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
            else {
                log::error!("the_canvas_id is not found or is not a canvas");
                return;
            };

            let start_result = eframe::WebRunner::new()
                .start(canvas, web_options, app_creator(config))
                .await;

            if let Some(loading_text) = document.get_element_by_id("loading_text") {
                match start_result {
                    Ok(_) => loading_text.remove(),
                    Err(err) => {
                        loading_text.set_inner_html(
                            "<p> The app has crashed. See the developer console for details. </p>",
                        );
                        log::error!("Failed to start eframe: {err:?}");
                    }
                }
            }
        });

        Ok(())
    }
}

fn app_creator<'app>(config: AppConfig) -> AppCreator<'app> {
    Box::new(move |cc: &eframe::CreationContext<'_>| {
        let ctx = cc.egui_ctx.clone();

        let source = UrlFeatureSource::new(config.annotations.source_url.clone());
        let mut state = AppState::initialize(config)?;
        state.set_messenger(MapStateMessenger::new(ctx.clone()));
        state.spawn_annotation_load(source);

        Ok(Box::new(HeatmapApp::new(state, ImageStore::new(ctx))))
    })
}
