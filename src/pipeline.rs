use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use tracing::{debug, instrument};

use crate::collaborators::delivery::{Delivery, PngFileDelivery};
use crate::collaborators::segmenter::Segmenter;
use crate::collaborators::source::{FileSource, ImageSource};
use crate::error::StickerError;
use crate::params::StickerParameters;
use crate::sticker_kit::apply_alpha_mask::{ApplyAlphaMaskExt, ModifyAlphaExt};
use crate::sticker_kit::clean_mask::CleanMaskExt;
use crate::sticker_kit::fit_canvas::FitCanvasExt;
use crate::sticker_kit::nlmeans::NLMeansExt;
use crate::sticker_kit::smooth_edges::SmoothEdgesExt;
use crate::sticker_kit::transparency::has_transparency;

/// Turns images into fixed-size transparent stickers.
///
/// The pipeline is stateless between calls: it can be cloned cheaply or shared
/// across threads to process independent images in parallel. The segmenter is
/// injected once and only ever borrowed immutably.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use sticker_kit::{SegmentError, StickerParameters, StickerPipeline};
/// use image::{GrayImage, Luma, RgbImage};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let segmenter = |image: &RgbImage| -> Result<GrayImage, SegmentError> {
///     Ok(GrayImage::from_pixel(image.width(), image.height(), Luma([255])))
/// };
/// let pipeline = StickerPipeline::new(Arc::new(segmenter), StickerParameters::default())?;
/// pipeline.process_file("input.jpg", "output/sticker.png")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StickerPipeline {
    segmenter: Arc<dyn Segmenter>,
    params: StickerParameters,
}

impl std::fmt::Debug for StickerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickerPipeline")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl StickerPipeline {
    /// Creates a pipeline around a loaded segmentation model.
    ///
    /// # Errors
    ///
    /// * `StickerError::InvalidParameter` - When `params` fail validation
    pub fn new(
        segmenter: Arc<dyn Segmenter>,
        params: StickerParameters,
    ) -> Result<Self, StickerError> {
        params.validate()?;
        Ok(Self { segmenter, params })
    }

    pub fn params(&self) -> &StickerParameters {
        &self.params
    }

    /// Full pipeline: cutout followed by canvas fitting.
    ///
    /// # Errors
    ///
    /// * Any error of [`cutout`](Self::cutout) or [`fit`](Self::fit)
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn process(&self, image: &DynamicImage) -> Result<RgbaImage, StickerError> {
        let cutout = self.cutout(image)?;
        self.fit(cutout)
    }

    /// Background removal at full resolution: segmentation, mask cleaning,
    /// edge smoothing, colour denoising and compositing.
    ///
    /// # Errors
    ///
    /// * `StickerError::EmptySourceImage` - When the image has zero width or height
    /// * `StickerError::Segmentation` - When the segmenter fails
    /// * `StickerError::DimensionMismatch` - When the mask size differs from the image size
    pub fn cutout(&self, image: &DynamicImage) -> Result<RgbaImage, StickerError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(StickerError::EmptySourceImage { width, height });
        }

        let color = image.to_rgb8();
        let rough_mask = self.rough_mask(image, &color)?;
        self.refine(color, rough_mask)
    }

    /// Mask cleaning, edge smoothing, colour denoising and compositing of an
    /// image with an already computed rough mask.
    ///
    /// # Errors
    ///
    /// * `StickerError::DimensionMismatch` - When the mask size differs from the image size
    /// * `StickerError::EmptySourceImage` - When the image has zero width or height
    pub fn refine(&self, color: RgbImage, rough_mask: GrayImage) -> Result<RgbaImage, StickerError> {
        if color.dimensions() != rough_mask.dimensions() {
            return Err(StickerError::DimensionMismatch {
                expected: color.dimensions(),
                actual: rough_mask.dimensions(),
            });
        }

        let mask = rough_mask
            .clean_mask(self.params.island_min_area, self.params.erosion_size)?
            .smooth_edges();
        let clean_color = color.nl_means(&self.params.denoise)?;
        debug!("refined mask and denoised colour");

        Ok(clean_color.apply_alpha_mask(&mask)?)
    }

    /// Fits an RGBA image onto the configured transparent canvas.
    ///
    /// # Errors
    ///
    /// * `StickerError::EmptySourceImage` - When the image has zero width or height
    pub fn fit(&self, cutout: RgbaImage) -> Result<RgbaImage, StickerError> {
        Ok(cutout.fit_canvas(
            self.params.target_width,
            self.params.target_height,
            self.params.fit_mode,
        )?)
    }

    /// Loads an image, turns it into a sticker and delivers it.
    ///
    /// Delivery only happens after every stage succeeded.
    ///
    /// # Errors
    ///
    /// * Any error of the source, [`process`](Self::process) or the delivery
    pub fn run(
        &self,
        source: &dyn ImageSource,
        delivery: &dyn Delivery,
    ) -> Result<RgbaImage, StickerError> {
        let image = source.load()?;
        let sticker = self.process(&image)?;
        delivery.deliver(&sticker)?;
        Ok(sticker)
    }

    /// Loads an image, removes its background at full resolution and delivers the cutout.
    ///
    /// # Errors
    ///
    /// * Any error of the source, [`cutout`](Self::cutout) or the delivery
    pub fn run_cutout(
        &self,
        source: &dyn ImageSource,
        delivery: &dyn Delivery,
    ) -> Result<RgbaImage, StickerError> {
        let image = source.load()?;
        let cutout = self.cutout(&image)?;
        delivery.deliver(&cutout)?;
        Ok(cutout)
    }

    /// Loads an image that is already a cutout, fits it onto the canvas and delivers it.
    ///
    /// # Errors
    ///
    /// * Any error of the source, [`fit`](Self::fit) or the delivery
    pub fn run_fit(
        &self,
        source: &dyn ImageSource,
        delivery: &dyn Delivery,
    ) -> Result<RgbaImage, StickerError> {
        let image = source.load()?;
        let sticker = self.fit(image.to_rgba8())?;
        delivery.deliver(&sticker)?;
        Ok(sticker)
    }

    /// Reads `input`, processes it and writes the sticker to `output` as PNG.
    ///
    /// # Errors
    ///
    /// * `StickerError::InputNotFound` - When `input` does not exist
    /// * `StickerError::Decode` - When `input` is not a decodable image
    /// * Any error of [`run`](Self::run)
    pub fn process_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<RgbaImage, StickerError> {
        self.run(
            &FileSource::new(input.as_ref()),
            &PngFileDelivery::new(output.as_ref()),
        )
    }

    fn rough_mask(&self, image: &DynamicImage, color: &RgbImage) -> Result<GrayImage, StickerError> {
        if self.params.reuse_existing_alpha && has_transparency(image) {
            debug!("reusing existing alpha channel as rough mask");
            return Ok(image.to_rgba8().extract_alpha());
        }
        Ok(self.segmenter.segment(color)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SegmentError;
    use crate::test_utils::{create_subject_image, draw_block};
    use image::{Luma, Rgba};

    fn block_segmenter(image: &RgbImage) -> Result<GrayImage, SegmentError> {
        let (width, height) = image.dimensions();
        let mut mask = GrayImage::new(width, height);
        draw_block(&mut mask, width / 4, height / 4, width / 2, height / 2, 255);
        Ok(mask)
    }

    fn pipeline(params: StickerParameters) -> StickerPipeline {
        StickerPipeline::new(Arc::new(block_segmenter), params).unwrap()
    }

    #[test]
    fn new_validates_parameters() {
        let params = StickerParameters {
            target_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            StickerPipeline::new(Arc::new(block_segmenter), params),
            Err(StickerError::InvalidParameter(_))
        ));
    }

    #[test]
    fn process_produces_target_sized_sticker() {
        let image = DynamicImage::ImageRgb8(create_subject_image(64, 48));
        let params = StickerParameters::default().with_target_size(40, 40);

        let sticker = pipeline(params).process(&image).unwrap();

        assert_eq!(sticker.dimensions(), (40, 40));
        assert_eq!(sticker.get_pixel(0, 0)[3], 0);
        assert_eq!(sticker.get_pixel(20, 20)[3], 255);
    }

    #[test]
    fn refine_rejects_mismatched_mask() {
        let result = pipeline(StickerParameters::default())
            .refine(RgbImage::new(8, 8), GrayImage::new(8, 7));
        assert!(matches!(
            result,
            Err(StickerError::DimensionMismatch {
                expected: (8, 8),
                actual: (8, 7)
            })
        ));
    }

    #[test]
    fn segmenter_with_wrong_size_is_dimension_mismatch() {
        let segmenter = |_: &RgbImage| -> Result<GrayImage, SegmentError> {
            Ok(GrayImage::new(3, 3))
        };
        let pipeline =
            StickerPipeline::new(Arc::new(segmenter), StickerParameters::default()).unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::new(10, 10));

        assert!(matches!(
            pipeline.cutout(&image),
            Err(StickerError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn segmenter_failure_is_reported() {
        let segmenter = |_: &RgbImage| -> Result<GrayImage, SegmentError> {
            Err(SegmentError::Backend("model not loaded".to_string()))
        };
        let pipeline =
            StickerPipeline::new(Arc::new(segmenter), StickerParameters::default()).unwrap();
        let image = DynamicImage::ImageRgb8(RgbImage::new(10, 10));

        assert!(matches!(
            pipeline.process(&image),
            Err(StickerError::Segmentation(SegmentError::Backend(_)))
        ));
    }

    #[test]
    fn empty_image_is_rejected_before_segmentation() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            pipeline(StickerParameters::default()).process(&image),
            Err(StickerError::EmptySourceImage {
                width: 0,
                height: 0
            })
        ));
    }

    #[test]
    fn existing_alpha_is_reused_when_enabled() {
        let mut rgba = image::RgbaImage::from_pixel(30, 30, Rgba([50, 60, 70, 0]));
        for y in 0..30 {
            rgba.put_pixel(2, y, Rgba([50, 60, 70, 255]));
        }
        let image = DynamicImage::ImageRgba8(rgba);
        let params = StickerParameters::default()
            .with_erosion_size(0)
            .with_island_min_area(0)
            .with_reuse_existing_alpha(true);

        let cutout = pipeline(params).cutout(&image).unwrap();

        // The segmenter would have produced the centre block instead of the stripe
        assert!(cutout.get_pixel(2, 15)[3] > 100);
        assert_eq!(cutout.get_pixel(15, 15)[3], 0);
    }

    #[test]
    fn fit_uses_configured_mode() {
        let params = StickerParameters::default()
            .with_target_size(20, 20)
            .with_fit_mode(crate::FitMode::ShrinkOnly);
        let cutout = RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255]));

        let sticker = pipeline(params).fit(cutout).unwrap();

        assert_eq!(sticker.dimensions(), (20, 20));
        assert_eq!(sticker.get_pixel(8, 8)[3], 255);
        assert_eq!(sticker.get_pixel(7, 8)[3], 0);
        assert_eq!(sticker.get_pixel(12, 8)[3], 0);
    }

    #[test]
    fn cutout_mask_is_cleaned_and_smoothed() {
        let image = DynamicImage::ImageRgb8(create_subject_image(40, 40));
        let segmenter = |image: &RgbImage| -> Result<GrayImage, SegmentError> {
            let mut mask = GrayImage::new(image.width(), image.height());
            draw_block(&mut mask, 10, 10, 20, 20, 255);
            // Speck of dust
            mask.put_pixel(2, 2, Luma([255]));
            Ok(mask)
        };
        let pipeline =
            StickerPipeline::new(Arc::new(segmenter), StickerParameters::default()).unwrap();

        let cutout = pipeline.cutout(&image).unwrap();

        assert_eq!(cutout.dimensions(), (40, 40));
        assert_eq!(cutout.get_pixel(2, 2)[3], 0);
        assert_eq!(cutout.get_pixel(20, 20)[3], 255);
        // Erosion shaved the top-left edge, smoothing left a soft ramp
        let edge = cutout.get_pixel(10, 20)[3];
        assert!(edge < 255, "edge alpha {edge}");
    }
}
