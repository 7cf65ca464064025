use image::{GenericImageView, GrayImage, Luma, Pixel, Rgb, RgbImage, RgbaImage, Rgba};
use imageproc::map::map_colors2;

use crate::{error::AlphaMaskError, utils::validate_matching_dimensions};

/// Trait providing functionality to apply alpha masks to images
///
/// This trait merges a grayscale mask into an RGB image as its alpha channel,
/// pixel for pixel, with no blending or interpolation. This consumes the
/// original image.
///
/// Note: This trait performs type conversion (Rgb -> Rgba). For replacing the
/// alpha channel of an existing RGBA image, use the `ModifyAlphaExt` trait.
pub trait ApplyAlphaMaskExt {
    /// Applies the specified mask to the image and generates an image with alpha channel
    ///
    /// # Arguments
    ///
    /// * `mask` - The alpha mask to apply (grayscale image)
    ///
    /// # Returns
    ///
    /// RGBA image with added alpha channel
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sticker_kit::ApplyAlphaMaskExt;
    /// use image::{GrayImage, RgbImage};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// // RGB image and mask must have the same dimensions
    /// let rgb_image = RgbImage::new(10, 10);
    /// let mask = GrayImage::new(10, 10);
    ///
    /// let rgba_image = rgb_image.apply_alpha_mask(&mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn apply_alpha_mask(self, mask: &GrayImage) -> Result<RgbaImage, AlphaMaskError>;
}

/// Trait for modifying alpha channel of existing RGBA images
///
/// This trait replaces the alpha channel of RGBA images while preserving
/// the RGB color channels.
pub trait ModifyAlphaExt {
    /// Replaces the alpha channel with the provided mask
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask dimensions don't match
    fn replace_alpha(self, mask: &GrayImage) -> Result<RgbaImage, AlphaMaskError>;

    /// Extracts the alpha channel as a mask.
    fn extract_alpha(&self) -> GrayImage;
}

impl ApplyAlphaMaskExt for RgbImage {
    fn apply_alpha_mask(self, mask: &GrayImage) -> Result<RgbaImage, AlphaMaskError> {
        validate_dimensions(&self, mask)?;

        Ok(map_colors2(
            &self,
            mask,
            |Rgb([red, green, blue]), Luma([alpha])| Rgba([red, green, blue, alpha]),
        ))
    }
}

impl ModifyAlphaExt for RgbaImage {
    fn replace_alpha(mut self, mask: &GrayImage) -> Result<RgbaImage, AlphaMaskError> {
        validate_dimensions(&self, mask)?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, Luma([alpha]))| {
                pixel.channels_mut()[3] = *alpha;
            });

        Ok(self)
    }

    fn extract_alpha(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([self.get_pixel(x, y)[3]])
        })
    }
}

/// Function to validate dimensions
#[inline]
fn validate_dimensions<I>(image: &I, mask: &GrayImage) -> Result<(), AlphaMaskError>
where
    I: GenericImageView,
{
    let (img_w, img_h) = image.dimensions();
    let (mask_w, mask_h) = mask.dimensions();

    validate_matching_dimensions(img_w, img_h, mask_w, mask_h, "ApplyAlphaMask").map_err(|_| {
        AlphaMaskError::DimensionMismatch {
            expected: (img_w, img_h),
            actual: (mask_w, mask_h),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_alpha_mask, create_test_rgb_image};

    #[test]
    fn test_validate_dimensions() {
        let image = RgbImage::new(10, 10);
        let mask = GrayImage::new(10, 10);

        assert!(validate_dimensions(&image, &mask).is_ok());

        let mask_wrong_size = GrayImage::new(5, 5);
        assert_eq!(
            validate_dimensions(&image, &mask_wrong_size),
            Err(AlphaMaskError::DimensionMismatch {
                expected: (10, 10),
                actual: (5, 5)
            })
        );
    }

    #[test]
    fn test_apply_alpha_mask() {
        let image = create_test_rgb_image();
        let mask = create_test_alpha_mask();

        let result = image.apply_alpha_mask(&mask).unwrap();

        assert_eq!(result.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(result.get_pixel(1, 0), &Rgba([100, 200, 150, 192]));
        assert_eq!(result.get_pixel(0, 1), &Rgba([150, 100, 200, 128]));
        assert_eq!(result.get_pixel(1, 1), &Rgba([50, 75, 25, 64]));
    }

    #[test]
    fn test_apply_alpha_mask_mismatch() {
        let image = RgbImage::new(3, 2);
        let mask = GrayImage::new(2, 3);

        assert!(matches!(
            image.apply_alpha_mask(&mask),
            Err(AlphaMaskError::DimensionMismatch {
                expected: (3, 2),
                actual: (2, 3)
            })
        ));
    }

    #[test]
    fn test_replace_and_extract_alpha() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
        let mask = create_test_alpha_mask();

        let result = image.replace_alpha(&mask).unwrap();

        // Color channels should remain unchanged, only alpha is replaced
        assert_eq!(result.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(result.get_pixel(1, 1), &Rgba([10, 20, 30, 64]));
        assert_eq!(result.extract_alpha(), mask);
    }
}
