//! HTTP access shared by all remote resources of the map.

use std::sync::LazyLock;

use bytes::Bytes;

use crate::decoded_image::DecodedImage;
use crate::error::{FetchError, HeatmapError};

/// Service that loads remote resources.
#[derive(Debug, Clone)]
pub struct PlatformService {
    http_client: reqwest::Client,
}

impl Default for PlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformService {
    /// Creates a new service with its own HTTP client.
    pub fn new() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        let builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        #[cfg(target_arch = "wasm32")]
        let builder = reqwest::Client::builder();

        let http_client = builder.build().unwrap_or_else(|err| {
            log::warn!("Failed to configure http client, using defaults: {err}");
            reqwest::Client::new()
        });

        Self { http_client }
    }

    /// Loads a byte array from the given url.
    pub async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::info!("Failed to load {url}: {status}");
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.bytes().await?)
    }

    /// Loads a UTF-8 document from the given url.
    pub async fn load_text_from_url(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.load_bytes_from_url(url).await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| FetchError::Parse(format!("{url} is not valid UTF-8: {err}")))
    }

    /// Loads and decodes an image from the given url.
    pub async fn load_image_url(&self, url: &str) -> Result<DecodedImage, HeatmapError> {
        let bytes = self.load_bytes_from_url(url).await?;
        DecodedImage::new(&bytes)
    }
}

static SERVICE: LazyLock<PlatformService> = LazyLock::new(PlatformService::new);

/// Returns the singleton instance of the platform service.
pub fn instance() -> &'static PlatformService {
    &SERVICE
}
