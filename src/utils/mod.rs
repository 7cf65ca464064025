//! Internal utility functions for sticker-kit.
//!
//! This module contains common functionality used across different image operations.

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
/// * `context` - A description of the context for error messages
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise an error
pub fn validate_non_empty_image(width: u32, height: u32, context: &str) -> Result<(), String> {
    if width == 0 || height == 0 {
        Err(format!("{context}: Image dimensions must be non-zero"))
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise an error
pub fn validate_matching_dimensions(
    width1: u32,
    height1: u32,
    width2: u32,
    height2: u32,
    context: &str,
) -> Result<(), String> {
    if width1 != width2 || height1 != height2 {
        Err(format!(
            "{context}: Image dimensions must match. Got {width1}x{height1} and {width2}x{height2}"
        ))
    } else {
        Ok(())
    }
}

/// Maps a possibly out-of-range coordinate back into `0..len` by mirroring
/// around the edge pixels without repeating them (`dcb|abcd|cba`).
#[inline]
pub fn reflect_101(index: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as i64;
    let period = 2 * (len - 1);
    let wrapped = index.rem_euclid(period);
    let mirrored = if wrapped >= len {
        period - wrapped
    } else {
        wrapped
    };
    mirrored as usize
}

/// Premultiplies an 8-bit colour value by an 8-bit alpha value, rounding to nearest.
#[inline]
pub fn premultiply_u8(color: u8, alpha: u8) -> u8 {
    let product = u32::from(color) * u32::from(alpha);
    ((product + 127) / 255) as u8
}

/// Reverses [`premultiply_u8`]; fully transparent pixels become black.
#[inline]
pub fn unpremultiply_u8(color: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    let restored = (u32::from(color) * 255 + u32::from(alpha) / 2) / u32::from(alpha);
    restored.min(255) as u8
}
