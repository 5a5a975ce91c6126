use std::borrow::Cow;

use chatpane_types::ImageBounds;
use image::{DynamicImage, imageops::FilterType};

/// Size of `src_width`×`src_height` scaled down to fit `bounds`.
///
/// Images already inside the bounds keep their size; larger ones are shrunk
/// by a single ratio so the aspect ratio is preserved. Each dimension is
/// rounded and clamped to `1..=max`.
pub fn thumbnail_dimensions(src_width: u32, src_height: u32, bounds: ImageBounds) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (src_width, src_height);
    }
    if src_width <= bounds.max_width && src_height <= bounds.max_height {
        return (src_width, src_height);
    }

    let ratio = f64::min(
        bounds.max_width as f64 / src_width as f64,
        bounds.max_height as f64 / src_height as f64,
    );
    let width = (src_width as f64 * ratio).round() as u32;
    let height = (src_height as f64 * ratio).round() as u32;
    (
        width.clamp(1, bounds.max_width.max(1)),
        height.clamp(1, bounds.max_height.max(1)),
    )
}

/// Scales images down into a bounding box with a high quality filter
#[derive(Debug, Clone, Copy)]
pub struct ImageScaler {
    bounds: ImageBounds,
    filter: FilterType,
}

impl ImageScaler {
    pub fn new(bounds: ImageBounds) -> Self {
        Self {
            bounds,
            filter: FilterType::Lanczos3,
        }
    }

    /// Scaler for history thumbnails (300×200)
    pub fn thumbnail() -> Self {
        Self::new(ImageBounds::thumbnail())
    }

    /// Scaler for attachment previews (80×50)
    pub fn preview() -> Self {
        Self::new(ImageBounds::preview())
    }

    pub fn bounds(&self) -> ImageBounds {
        self.bounds
    }

    pub fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.bounds.max_width && height <= self.bounds.max_height
    }

    /// Borrow `image` unchanged when it fits, otherwise resample it down.
    /// Never upscales.
    pub fn scale<'a>(&self, image: &'a DynamicImage) -> Cow<'a, DynamicImage> {
        let (width, height) = thumbnail_dimensions(image.width(), image.height(), self.bounds);
        if (width, height) == (image.width(), image.height()) {
            return Cow::Borrowed(image);
        }

        log::trace!(
            "Scaling image {}x{} -> {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        Cow::Owned(image.resize_exact(width, height, self.filter))
    }
}

impl Default for ImageScaler {
    fn default() -> Self {
        Self::thumbnail()
    }
}
