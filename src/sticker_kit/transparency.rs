use image::{DynamicImage, RgbaImage};
use itertools::Itertools;

/// Reports whether an image already carries transparency.
///
/// True when the image has an alpha channel and at least one pixel is not
/// fully opaque. Such images can skip segmentation and go straight to
/// canvas fitting.
pub fn has_transparency(image: &DynamicImage) -> bool {
    if !image.color().has_alpha() {
        return false;
    }
    match image {
        DynamicImage::ImageLumaA8(buffer) => buffer.pixels().any(|p| p[1] < u8::MAX),
        DynamicImage::ImageRgba8(buffer) => buffer.pixels().any(|p| p[3] < u8::MAX),
        DynamicImage::ImageLumaA16(buffer) => buffer.pixels().any(|p| p[1] < u16::MAX),
        DynamicImage::ImageRgba16(buffer) => buffer.pixels().any(|p| p[3] < u16::MAX),
        other => other.to_rgba32f().pixels().any(|p| p[3] < 1.0),
    }
}

/// Queries about the visible area of RGBA images.
pub trait TransparencyExt {
    /// Bounding box `(x, y, width, height)` of the pixels with non-zero alpha,
    /// or `None` when the image is fully transparent.
    fn opaque_bounds(&self) -> Option<(u32, u32, u32, u32)>;
}

impl TransparencyExt for RgbaImage {
    fn opaque_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let visible = || self.enumerate_pixels().filter(|(_, _, p)| p[3] > 0);

        let (min_x, max_x) = visible().map(|(x, _, _)| x).minmax().into_option()?;
        let (min_y, max_y) = visible().map(|(_, y, _)| y).minmax().into_option()?;

        Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}
