use image::{GrayImage, ImageBuffer, Luma};

use crate::utils::reflect_101;

/// Integer taps of the 3-tap Gaussian, the sigma a 3x3 Gaussian gets when
/// sigma is derived from the kernel size. They sum to 4 per pass.
const GAUSSIAN_3: [u16; 3] = [1, 2, 1];

/// Trait for softening the stair-stepped edges left by binarization and erosion.
pub trait SmoothEdgesExt {
    /// Applies a fixed 3x3 Gaussian blur to the mask.
    ///
    /// Borders are mirrored without repeating the edge pixel (reflect-101),
    /// and the result is rounded to the nearest value.
    ///
    /// This consumes the original mask.
    fn smooth_edges(self) -> Self;
}

impl SmoothEdgesExt for GrayImage {
    fn smooth_edges(self) -> Self {
        if self.width() == 0 || self.height() == 0 {
            return self;
        }

        let (width, height) = self.dimensions();
        let tap = |offset: usize, index: u32, delta: i64, len: u32| {
            (GAUSSIAN_3[offset], reflect_101(i64::from(index) + delta, len as usize) as u32)
        };

        // Unnormalized horizontal sums fit in u16 (at most 4 * 255)
        let horizontal: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(width, height, |x, y| {
                let sum: u16 = (-1..=1)
                    .enumerate()
                    .map(|(offset, delta)| {
                        let (weight, sx) = tap(offset, x, delta, width);
                        weight * u16::from(self.get_pixel(sx, y)[0])
                    })
                    .sum();
                Luma([sum])
            });

        GrayImage::from_fn(width, height, |x, y| {
            let sum: u16 = (-1..=1)
                .enumerate()
                .map(|(offset, delta)| {
                    let (weight, sy) = tap(offset, y, delta, height);
                    weight * horizontal.get_pixel(x, sy)[0]
                })
                .sum();
            Luma([((sum + 8) / 16) as u8])
        })
    }
}
