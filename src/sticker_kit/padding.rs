use image::{imageops, ImageBuffer, Pixel};

use crate::error::PaddingError;

/// Calculates where an image of `size` lands when centred on a canvas of `pad_size`.
///
/// Odd remainders round toward the top-left.
///
/// # Errors
///
/// * `PaddingError::PaddingWidthTooSmall` - When the canvas is narrower than the image
/// * `PaddingError::PaddingHeightTooSmall` - When the canvas is shorter than the image
pub fn centered_position(
    size: (u32, u32),
    pad_size: (u32, u32),
) -> Result<(u32, u32), PaddingError> {
    let (width, height) = size;
    let (pad_width, pad_height) = pad_size;

    if pad_width < width {
        return Err(PaddingError::PaddingWidthTooSmall { width, pad_width });
    }

    if pad_height < height {
        return Err(PaddingError::PaddingHeightTooSmall { height, pad_height });
    }

    Ok(((pad_width - width) / 2, (pad_height - height) / 2))
}

/// Trait for centring an image on a larger canvas filled with one color
pub trait PaddingExt<P: Pixel> {
    /// Pastes the image onto the centre of a `pad_size` canvas filled with `color`.
    ///
    /// Image pixels replace canvas pixels; nothing is blended.
    ///
    /// # Returns
    ///
    /// The padded image and the offset the original was placed at
    ///
    /// # Errors
    ///
    /// * `PaddingError` - When the canvas is smaller than the image
    fn add_padding(
        self,
        pad_size: (u32, u32),
        color: P,
    ) -> Result<(ImageBuffer<P, Vec<P::Subpixel>>, (u32, u32)), PaddingError>;
}

impl<P: Pixel> PaddingExt<P> for ImageBuffer<P, Vec<P::Subpixel>> {
    fn add_padding(
        self,
        pad_size: (u32, u32),
        color: P,
    ) -> Result<(Self, (u32, u32)), PaddingError> {
        let (x, y) = centered_position(self.dimensions(), pad_size)?;
        let (pad_width, pad_height) = pad_size;
        let mut canvas = Self::from_pixel(pad_width, pad_height, color);
        imageops::replace(&mut canvas, &self, i64::from(x), i64::from(y));
        Ok((canvas, (x, y)))
    }
}
