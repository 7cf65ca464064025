use image::{
    imageops::{self, FilterType},
    Rgba, RgbaImage,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FitError;
use crate::sticker_kit::alpha_premultiply::PremultiplyAlphaExt;
use crate::sticker_kit::padding::PaddingExt;

/// How images smaller than the target box are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale up or down until the limiting dimension touches the box.
    #[default]
    Contain,
    /// Only ever scale down; smaller images are centred at their own size.
    ShrinkOnly,
}

/// Size of the content after an aspect-preserving fit of `source` into `target`.
///
/// Both axes are scaled by `min(target_w / w, target_h / h)`, rounded, and
/// kept within `1..=target` so rounding can never overflow the box.
pub fn fitted_size(source: (u32, u32), target: (u32, u32), mode: FitMode) -> (u32, u32) {
    let (width, height) = source;
    let (target_width, target_height) = target;

    let mut scale = f64::min(
        f64::from(target_width) / f64::from(width),
        f64::from(target_height) / f64::from(height),
    );
    if mode == FitMode::ShrinkOnly {
        scale = scale.min(1.0);
    }

    let scaled = |length: u32, bound: u32| -> u32 {
        let length = (f64::from(length) * scale).round() as u32;
        length.clamp(1, bound)
    };
    (scaled(width, target_width), scaled(height, target_height))
}

/// Trait for fitting a cutout onto a fixed-size transparent canvas.
pub trait FitCanvasExt {
    /// Resizes the image to fit `target_width x target_height` without changing its
    /// aspect ratio, then centres it on a fully transparent canvas of exactly that size.
    ///
    /// Resampling uses Lanczos on premultiplied alpha. When the fitted size equals the
    /// current size no resampling happens, so fitting a fitted image again is a no-op.
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `FitError::EmptySourceImage` - When the image has zero width or height
    /// * `FitError::InvalidTargetDimensions` - When a target dimension is zero
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sticker_kit::{FitCanvasExt, FitMode};
    /// use image::RgbaImage;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let cutout = RgbaImage::new(1000, 500);
    /// let sticker = cutout.fit_canvas(370, 320, FitMode::Contain)?;
    /// assert_eq!(sticker.dimensions(), (370, 320));
    /// # Ok(())
    /// # }
    /// ```
    fn fit_canvas(
        self,
        target_width: u32,
        target_height: u32,
        mode: FitMode,
    ) -> Result<RgbaImage, FitError>;
}

impl FitCanvasExt for RgbaImage {
    fn fit_canvas(
        self,
        target_width: u32,
        target_height: u32,
        mode: FitMode,
    ) -> Result<RgbaImage, FitError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(FitError::EmptySourceImage { width, height });
        }
        if target_width == 0 || target_height == 0 {
            return Err(FitError::InvalidTargetDimensions {
                width: target_width,
                height: target_height,
            });
        }

        let (resized_width, resized_height) =
            fitted_size((width, height), (target_width, target_height), mode);

        let content = if (resized_width, resized_height) == (width, height) {
            self
        } else {
            let premultiplied = self.premultiply_alpha();
            imageops::resize(
                &premultiplied,
                resized_width,
                resized_height,
                FilterType::Lanczos3,
            )
            .unpremultiply_alpha()
        };

        let (canvas, offset) =
            content.add_padding((target_width, target_height), Rgba([0, 0, 0, 0]))?;

        debug!(
            source = ?(width, height),
            resized = ?(resized_width, resized_height),
            ?offset,
            "fitted image onto canvas"
        );

        Ok(canvas)
    }
}
