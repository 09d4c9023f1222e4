//! Single image stretched over a geographic rectangle.

use std::any::Any;

use asu_heatmap_types::cartesian::Rect;

use crate::bounds::GeographicBounds;
use crate::error::HeatmapError;
use crate::layer::attribution::Attribution;
use crate::layer::Layer;
use crate::render::Canvas;
use crate::view::MapView;

/// Layer that draws one image so that its corners match the corners of [`GeographicBounds`].
#[derive(Debug, Clone)]
pub struct ImageOverlay {
    url: String,
    bounds: GeographicBounds,
    projected: Rect,
    opacity: f32,
    attribution: Option<Attribution>,
}

impl ImageOverlay {
    /// Creates a new overlay. Opacity is clamped into `[0, 1]`.
    pub fn new(
        url: impl Into<String>,
        bounds: GeographicBounds,
        opacity: f32,
    ) -> Result<Self, HeatmapError> {
        bounds.validate()?;
        let projected = bounds
            .projected()
            .ok_or_else(|| HeatmapError::InvalidBounds("bounds cannot be projected".into()))?;

        Ok(Self {
            url: url.into(),
            bounds,
            projected,
            opacity: clamp_opacity(opacity),
            attribution: None,
        })
    }

    /// Sets the attribution of the image.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Location of the image.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Geographic rectangle the image is stretched over.
    pub fn bounds(&self) -> &GeographicBounds {
        &self.bounds
    }

    /// Current opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Changes the opacity. Values outside of `[0, 1]` are clamped.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
    }

    /// Screen rectangle of the image at the given view.
    pub fn screen_rect(&self, view: &MapView) -> Rect {
        view.rect_to_screen(&self.projected)
    }
}

fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}

impl Layer for ImageOverlay {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        if self.opacity <= 0.0 {
            return;
        }

        if let Some(visible) = view.get_bbox() {
            if !visible.intersects(&self.projected) {
                return;
            }
        }

        canvas.draw_image(&self.url, self.screen_rect(view), self.opacity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}
