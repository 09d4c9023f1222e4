//! Images decoded into RGBA pixels, ready to be uploaded to the renderer.

use image::GenericImageView;

use crate::error::HeatmapError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    dimensions: (u32, u32),
}

impl DecodedImage {
    /// Decode an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images
    /// will be converted to RGBA.
    pub fn new(bytes: &[u8]) -> Result<Self, HeatmapError> {
        let decoded = image::load_from_memory(bytes)?;
        let dimensions = decoded.dimensions();
        let bytes = decoded.to_rgba8();

        Ok(Self {
            bytes: bytes.into_vec(),
            dimensions,
        })
    }

    /// RGBA pixels, row by row.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.0
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.1
    }
}
