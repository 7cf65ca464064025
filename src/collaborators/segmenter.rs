use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::SegmentError;
use crate::sticker_kit::transparency::has_transparency;

/// Foreground segmentation model.
///
/// Given an RGB image, returns a rough per-pixel foreground alpha of the same
/// dimensions (0 = background, 255 = foreground). The model is loaded once and
/// shared read-only between pipeline invocations, hence `Send + Sync`.
pub trait Segmenter: Send + Sync {
    /// Estimates the foreground alpha of `image`.
    ///
    /// # Errors
    ///
    /// * `SegmentError` - When the model fails to produce a mask
    fn segment(&self, image: &RgbImage) -> Result<GrayImage, SegmentError>;
}

impl<F> Segmenter for F
where
    F: Fn(&RgbImage) -> Result<GrayImage, SegmentError> + Send + Sync,
{
    fn segment(&self, image: &RgbImage) -> Result<GrayImage, SegmentError> {
        self(image)
    }
}

/// Mask source for images that were already cut out.
///
/// Reads the alpha channel of the image it was built from, so inputs that
/// arrive with transparency can run through the same cleaning stages
/// without a model.
#[derive(Debug, Clone)]
pub struct AlphaChannelSegmenter {
    alpha: GrayImage,
}

impl AlphaChannelSegmenter {
    /// Captures the alpha channel of `image`.
    ///
    /// # Errors
    ///
    /// * `SegmentError::NoTransparency` - When the image is fully opaque or has no alpha
    pub fn from_image(image: &DynamicImage) -> Result<Self, SegmentError> {
        if !has_transparency(image) {
            return Err(SegmentError::NoTransparency);
        }
        let rgba = image.to_rgba8();
        let alpha = GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            Luma([rgba.get_pixel(x, y)[3]])
        });
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> &GrayImage {
        &self.alpha
    }
}

impl Segmenter for AlphaChannelSegmenter {
    fn segment(&self, image: &RgbImage) -> Result<GrayImage, SegmentError> {
        if image.dimensions() != self.alpha.dimensions() {
            return Err(SegmentError::Backend(format!(
                "alpha channel is {:?} but image is {:?}",
                self.alpha.dimensions(),
                image.dimensions()
            )));
        }
        Ok(self.alpha.clone())
    }
}
