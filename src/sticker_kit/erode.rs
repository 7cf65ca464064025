use image::{GrayImage, Luma};

use crate::error::MaskError;

/// Square structuring element for grayscale erosion.
///
/// A side of `k` covers the offsets `-(k / 2) ..= k - 1 - k / 2` on both axes,
/// so even sides lean towards the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareKernel {
    side: u32,
}

impl SquareKernel {
    /// Creates a kernel with the given side length.
    ///
    /// # Errors
    ///
    /// * `MaskError::InvalidParameter` - When `side` is zero
    pub fn new(side: u32) -> Result<Self, MaskError> {
        if side == 0 {
            return Err(MaskError::InvalidParameter(
                "structuring element side must be positive".to_string(),
            ));
        }
        Ok(Self { side })
    }

    /// Kernel used to shrink a mask edge inward by roughly `erosion_size` pixels.
    ///
    /// The side saturates at `u32::MAX`.
    pub const fn for_erosion_size(erosion_size: u32) -> Self {
        Self {
            side: erosion_size.saturating_add(1),
        }
    }

    pub const fn side(&self) -> u32 {
        self.side
    }

    const fn reach(&self) -> (u32, u32) {
        let before = self.side / 2;
        (before, self.side - 1 - before)
    }
}

/// Trait for grayscale morphological erosion of masks.
///
/// Every output pixel is the minimum of the input pixels covered by the kernel.
/// Pixels outside the image are ignored rather than treated as background,
/// so a mask touching the image border is not eroded from that side.
pub trait ErodeMaskExt {
    /// Erodes the mask with a square kernel, one iteration.
    ///
    /// This consumes the original mask.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sticker_kit::{ErodeMaskExt, SquareKernel};
    /// use image::GrayImage;
    ///
    /// let mask = GrayImage::new(10, 10);
    /// let eroded = mask.erode_mask(SquareKernel::for_erosion_size(1));
    /// ```
    fn erode_mask(self, kernel: SquareKernel) -> Self;
}

impl ErodeMaskExt for GrayImage {
    fn erode_mask(self, kernel: SquareKernel) -> Self {
        if kernel.side() == 1 || self.width() == 0 || self.height() == 0 {
            return self;
        }

        let (width, height) = self.dimensions();
        let (before, after) = kernel.reach();

        let horizontal = GrayImage::from_fn(width, height, |x, y| {
            let start = x.saturating_sub(before);
            let end = x.saturating_add(after).min(width - 1);
            let min = (start..=end)
                .map(|sx| self.get_pixel(sx, y)[0])
                .min()
                .unwrap_or(0);
            Luma([min])
        });

        GrayImage::from_fn(width, height, |x, y| {
            let start = y.saturating_sub(before);
            let end = y.saturating_add(after).min(height - 1);
            let min = (start..=end)
                .map(|sy| horizontal.get_pixel(x, sy)[0])
                .min()
                .unwrap_or(0);
            Luma([min])
        })
    }
}
