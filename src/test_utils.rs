//! Test utilities for sticker-kit
//!
//! Fixtures and helpers shared by the unit tests. Only compiled for tests.

use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// Creates a 2x2 RGB image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
pub fn create_test_rgb_image() -> RgbImage {
    let mut image = RgbImage::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Creates a 2x2 RGBA image with known pixel values including alpha:
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> RgbaImage {
    let mut image = RgbaImage::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Creates a 2x2 alpha mask with values 255, 192, 128 and 64 in row-major order.
pub fn create_test_alpha_mask() -> GrayImage {
    let mut mask = GrayImage::new(2, 2);
    mask.put_pixel(0, 0, Luma([255]));
    mask.put_pixel(1, 0, Luma([192]));
    mask.put_pixel(0, 1, Luma([128]));
    mask.put_pixel(1, 1, Luma([64]));
    mask
}

/// Fills a `width` x `height` rectangle at (`x`, `y`) with `value`, clipped to the mask.
pub fn draw_block(mask: &mut GrayImage, x: u32, y: u32, width: u32, height: u32, value: u8) {
    let x_end = x.saturating_add(width).min(mask.width());
    let y_end = y.saturating_add(height).min(mask.height());
    for py in y..y_end {
        for px in x..x_end {
            mask.put_pixel(px, py, Luma([value]));
        }
    }
}

/// Number of mask pixels whose value is at least `min_value`.
pub fn count_opaque(mask: &GrayImage, min_value: u8) -> usize {
    mask.pixels().filter(|p| p[0] >= min_value).count()
}

/// Flat colour image with deterministic pseudo-random noise of up to
/// `amplitude` added to or subtracted from every channel.
pub fn create_noisy_flat_image(width: u32, height: u32, base: Rgb<u8>, amplitude: u8) -> RgbImage {
    let span = u32::from(amplitude) * 2 + 1;
    let mut state: u32 = 0x2545_f491;
    let mut next_offset = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((state >> 16) % span) as i16 - i16::from(amplitude)
    };

    RgbImage::from_fn(width, height, |_, _| {
        let mut pixel = base;
        for channel in pixel.0.iter_mut() {
            *channel = (i16::from(*channel) + next_offset()).clamp(0, 255) as u8;
        }
        pixel
    })
}

/// Warm-coloured ellipse on a pale background, roughly what a generated
/// character illustration looks like to the pipeline.
pub fn create_subject_image(width: u32, height: u32) -> RgbImage {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (rx, ry) = (width as f32 / 3.0, height as f32 / 3.0);
    RgbImage::from_fn(width, height, |x, y| {
        let dx = (x as f32 + 0.5 - cx) / rx;
        let dy = (y as f32 + 0.5 - cy) / ry;
        if dx * dx + dy * dy <= 1.0 {
            Rgb([220, 120, 60])
        } else {
            Rgb([235, 235, 240])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_have_documented_values() {
        let rgb = create_test_rgb_image();
        assert_eq!(rgb.get_pixel(1, 1), &Rgb([50, 75, 25]));

        let rgba = create_test_rgba_image();
        assert_eq!(rgba.get_pixel(1, 0), &Rgba([100, 200, 150, 128]));

        let mask = create_test_alpha_mask();
        assert_eq!(mask.get_pixel(0, 1), &Luma([128]));
    }

    #[test]
    fn draw_block_clips_to_mask() {
        let mut mask = GrayImage::new(5, 5);
        draw_block(&mut mask, 3, 3, 10, 10, 200);
        assert_eq!(count_opaque(&mask, 1), 4);
        assert_eq!(count_opaque(&mask, 201), 0);
    }

    #[test]
    fn noisy_image_is_deterministic_and_bounded() {
        let a = create_noisy_flat_image(8, 8, Rgb([100, 100, 100]), 5);
        let b = create_noisy_flat_image(8, 8, Rgb([100, 100, 100]), 5);
        assert_eq!(a, b);
        assert!(a.pixels().flat_map(|p| p.0).all(|v| (95..=105).contains(&v)));
        assert!(a.pixels().any(|p| p[0] != 100));
    }

    #[test]
    fn subject_image_has_centred_subject() {
        let image = create_subject_image(30, 30);
        assert_eq!(image.get_pixel(15, 15), &Rgb([220, 120, 60]));
        assert_eq!(image.get_pixel(0, 0), &Rgb([235, 235, 240]));
    }
}
