use std::sync::Arc;

use asu_heatmap::async_runtime;
use asu_heatmap::decoded_image::DecodedImage;
use asu_heatmap::platform;
use egui::{ColorImage, TextureHandle, TextureOptions};
use quick_cache::sync::Cache;

const DEFAULT_CAPACITY: usize = 2000;

enum ImageState {
    Loading,
    Loaded(DecodedImage),
    Rendered(TextureHandle),
    Error,
}

/// Remote images (tiles, the heat map, marker icons) as egui textures.
///
/// Images are requested on the first access and loaded in the background. Until an image is
/// loaded, and forever if the loading fails, [`ImageStore::texture`] returns `None` and the image
/// is not drawn. The least used images are evicted when the store is full.
#[derive(Clone)]
pub struct ImageStore {
    images: Arc<Cache<String, Arc<ImageState>>>,
    context: egui::Context,
}

impl ImageStore {
    /// Creates a store that repaints the given context when an image arrives.
    pub fn new(context: egui::Context) -> Self {
        Self::with_capacity(context, DEFAULT_CAPACITY)
    }

    /// Creates a store holding at most `capacity` images.
    pub fn with_capacity(context: egui::Context, capacity: usize) -> Self {
        Self {
            images: Arc::new(Cache::new(capacity)),
            context,
        }
    }

    /// Texture of the image at `url`, or `None` if it is not available (yet).
    pub fn texture(&self, url: &str) -> Option<TextureHandle> {
        let Some(state) = self.images.get(url) else {
            self.load(url);
            return None;
        };

        match state.as_ref() {
            ImageState::Loading | ImageState::Error => None,
            ImageState::Rendered(texture) => Some(texture.clone()),
            ImageState::Loaded(image) => {
                let texture =
                    self.context
                        .load_texture(url, to_color_image(image), TextureOptions::LINEAR);
                self.images
                    .insert(url.to_string(), Arc::new(ImageState::Rendered(texture.clone())));
                Some(texture)
            }
        }
    }

    fn load(&self, url: &str) {
        self.images
            .insert(url.to_string(), Arc::new(ImageState::Loading));

        let images = self.images.clone();
        let context = self.context.clone();
        let url = url.to_string();
        async_runtime::spawn(async move {
            match platform::instance().load_image_url(&url).await {
                Ok(image) => {
                    log::trace!("Loaded image {url}");
                    images.insert(url, Arc::new(ImageState::Loaded(image)));
                    context.request_repaint();
                }
                Err(err) => {
                    log::warn!("Failed to load image {url}: {err}");
                    images.insert(url, Arc::new(ImageState::Error));
                }
            }
        });
    }
}

fn to_color_image(image: &DecodedImage) -> ColorImage {
    ColorImage::from_rgba_unmultiplied(
        [image.width() as usize, image.height() as usize],
        image.bytes(),
    )
}
