use image::{Rgba, RgbaImage};
use imageproc::map::map_colors;

use crate::utils::{premultiply_u8, unpremultiply_u8};

/// Trait for converting RGBA images to and from premultiplied alpha.
///
/// Resampling straight (non-premultiplied) RGBA lets the undefined colour of
/// fully transparent pixels bleed into visible edges. Resampling the
/// premultiplied form weights every colour by its opacity instead:
/// - Red' = Red × Alpha
/// - Green' = Green × Alpha
/// - Blue' = Blue × Alpha
///
/// The alpha channel itself is kept unchanged.
pub trait PremultiplyAlphaExt {
    /// Multiplies the colour channels by alpha.
    ///
    /// This consumes the original image.
    fn premultiply_alpha(self) -> Self;

    /// Divides the colour channels by alpha; fully transparent pixels become
    /// transparent black.
    ///
    /// This consumes the original image.
    fn unpremultiply_alpha(self) -> Self;
}

impl PremultiplyAlphaExt for RgbaImage {
    fn premultiply_alpha(self) -> Self {
        map_colors(&self, |Rgba([red, green, blue, alpha])| {
            Rgba([
                premultiply_u8(red, alpha),
                premultiply_u8(green, alpha),
                premultiply_u8(blue, alpha),
                alpha,
            ])
        })
    }

    fn unpremultiply_alpha(self) -> Self {
        map_colors(&self, |Rgba([red, green, blue, alpha])| {
            Rgba([
                unpremultiply_u8(red, alpha),
                unpremultiply_u8(green, alpha),
                unpremultiply_u8(blue, alpha),
                alpha,
            ])
        })
    }
}
