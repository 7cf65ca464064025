use image::{GrayImage, Luma, Rgb, RgbImage};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::NLMeansError;
use crate::utils::{reflect_101, validate_non_empty_image};

/// Parameters of the Non-Local Means denoiser.
///
/// The defaults give the flat colour fields typical of stickers without
/// smearing outlines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlMeansParams {
    /// Filtering strength for the luminance plane
    pub h: f32,
    /// Filtering strength for the two chroma planes
    pub h_color: f32,
    /// Side of the patch compared between pixels (odd)
    pub template_window: u32,
    /// Side of the area searched for similar patches (odd, larger than the template)
    pub search_window: u32,
}

impl Default for NlMeansParams {
    fn default() -> Self {
        Self {
            h: 5.0,
            h_color: 5.0,
            template_window: 7,
            search_window: 21,
        }
    }
}

impl NlMeansParams {
    /// Checks the strengths and window sizes.
    ///
    /// # Errors
    ///
    /// * `NLMeansError::InvalidFilteringParameter` - If a strength is not positive
    /// * `NLMeansError::InvalidWindowSize` - If a window size is not an odd positive integer
    /// * `NLMeansError::InvalidWindowSizes` - If the search window is not larger than the template
    pub fn validate(&self) -> Result<(), NLMeansError> {
        for h in [self.h, self.h_color] {
            if !(h.is_finite() && h > 0.0) {
                return Err(NLMeansError::InvalidFilteringParameter { h });
            }
        }

        for size in [self.template_window, self.search_window] {
            if size == 0 || size % 2 == 0 {
                return Err(NLMeansError::InvalidWindowSize { size });
            }
        }

        if self.search_window <= self.template_window {
            return Err(NLMeansError::InvalidWindowSizes {
                template_window: self.template_window,
                search_window: self.search_window,
            });
        }

        Ok(())
    }
}

/// Non-Local Means denoising trait
///
/// Non-Local Means replaces each pixel with a weighted average of the pixels
/// in its search window. A neighbour's weight depends on how similar the
/// patch (template window) around it is to the patch around the pixel:
///
/// `w = exp(-d / h²)`, where `d` is the mean squared difference of the two
/// patches over all their pixels and channels.
///
/// Colour images are split into luminance and chroma first. The luminance plane
/// is filtered with `h` and the chroma planes jointly with `h_color`, so colour
/// noise can be removed without flattening shading.
///
/// Patch distances are evaluated per search offset with a summed-area table,
/// which makes the cost independent of the template size. Image borders are
/// mirrored, so any non-empty image is accepted regardless of the window sizes.
///
/// # Examples
///
/// ```no_run
/// use sticker_kit::{NLMeansExt, NlMeansParams};
/// use image::{ImageBuffer, Rgb};
///
/// let rgb_image = ImageBuffer::from_pixel(10, 10, Rgb([100u8, 150u8, 200u8]));
/// let denoised = rgb_image.nl_means(&NlMeansParams::default()).unwrap();
/// assert_eq!(denoised.dimensions(), (10, 10));
/// ```
pub trait NLMeansExt {
    /// Apply Non-Local Means denoising to the image
    ///
    /// # Errors
    ///
    /// * `NLMeansError::EmptyImage` - If the image has zero width or height
    /// * Any error of [`NlMeansParams::validate`]
    fn nl_means(&self, params: &NlMeansParams) -> Result<Self, NLMeansError>
    where
        Self: Sized;
}

impl NLMeansExt for GrayImage {
    fn nl_means(&self, params: &NlMeansParams) -> Result<Self, NLMeansError> {
        let (width, height) = self.dimensions();
        validate(params, width, height)?;

        let plane: Vec<f32> = self.pixels().map(|p| f32::from(p[0])).collect();
        let filtered = PlaneSet::new(vec![plane], width, height).denoise(params.h, params);

        Ok(GrayImage::from_fn(width, height, |x, y| {
            let index = (y * width + x) as usize;
            Luma([to_u8(filtered[0][index])])
        }))
    }
}

impl NLMeansExt for RgbImage {
    fn nl_means(&self, params: &NlMeansParams) -> Result<Self, NLMeansError> {
        let (width, height) = self.dimensions();
        validate(params, width, height)?;

        let pixel_count = (width * height) as usize;
        let mut luma = Vec::with_capacity(pixel_count);
        let mut cb = Vec::with_capacity(pixel_count);
        let mut cr = Vec::with_capacity(pixel_count);
        for pixel in self.pixels() {
            let [y, u, v] = rgb_to_ycbcr(*pixel);
            luma.push(y);
            cb.push(u);
            cr.push(v);
        }

        let luma = PlaneSet::new(vec![luma], width, height).denoise(params.h, params);
        let chroma = PlaneSet::new(vec![cb, cr], width, height).denoise(params.h_color, params);

        Ok(RgbImage::from_fn(width, height, |x, y| {
            let index = (y * width + x) as usize;
            ycbcr_to_rgb([luma[0][index], chroma[0][index], chroma[1][index]])
        }))
    }
}

fn validate(params: &NlMeansParams, width: u32, height: u32) -> Result<(), NLMeansError> {
    params.validate()?;
    validate_non_empty_image(width, height, "NL-Means")
        .map_err(|_| NLMeansError::EmptyImage { width, height })
}

/// Full-range BT.601 luminance/chroma split.
#[inline]
fn rgb_to_ycbcr(Rgb([r, g, b]): Rgb<u8>) -> [f32; 3] {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b,
        128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b,
    ]
}

#[inline]
fn ycbcr_to_rgb([y, cb, cr]: [f32; 3]) -> Rgb<u8> {
    let cb = cb - 128.0;
    let cr = cr - 128.0;
    Rgb([
        to_u8(y + 1.402 * cr),
        to_u8(y - 0.344_136 * cb - 0.714_136 * cr),
        to_u8(y + 1.772 * cb),
    ])
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Planes filtered together: patch distances are summed over all of them.
struct PlaneSet {
    planes: Vec<Vec<f32>>,
    width: usize,
    height: usize,
}

impl PlaneSet {
    fn new(planes: Vec<Vec<f32>>, width: u32, height: u32) -> Self {
        Self {
            planes,
            width: width as usize,
            height: height as usize,
        }
    }

    fn denoise(&self, h: f32, params: &NlMeansParams) -> Vec<Vec<f32>> {
        let channels = self.planes.len();
        let (width, height) = (self.width, self.height);
        let template = params.template_window as usize;
        let template_radius = template / 2;
        let search_radius = (params.search_window / 2) as usize;
        let pad = template_radius + search_radius;

        let padded = self.reflect_pad(pad);
        let padded_width = width + 2 * pad;

        // Area over which patch differences are needed for one offset
        let region_width = width + 2 * template_radius;
        let region_height = height + 2 * template_radius;
        let sat_width = region_width + 1;
        let mut sat = vec![0f64; sat_width * (region_height + 1)];

        let normalization = (template * template * channels) as f64 * f64::from(h * h);
        let stride = channels + 1;
        let mut accumulator = vec![0f32; width * height * stride];

        let search = -(search_radius as isize)..=search_radius as isize;
        for dy in search.clone() {
            for dx in search.clone() {
                // Summed-area table of the squared difference between the image
                // and itself shifted by (dx, dy)
                for v in 0..region_height {
                    let mut row_sum = 0f64;
                    let py = search_radius + v;
                    let qy = (py as isize + dy) as usize;
                    for u in 0..region_width {
                        let px = search_radius + u;
                        let qx = (px as isize + dx) as usize;
                        let p = py * padded_width + px;
                        let q = qy * padded_width + qx;
                        let diff: f32 = padded
                            .iter()
                            .map(|plane| {
                                let d = plane[p] - plane[q];
                                d * d
                            })
                            .sum();
                        row_sum += f64::from(diff);
                        sat[(v + 1) * sat_width + u + 1] = sat[v * sat_width + u + 1] + row_sum;
                    }
                }

                let accumulate_row = |(y, row): (usize, &mut [f32])| {
                    let qy = ((pad + y) as isize + dy) as usize;
                    for x in 0..width {
                        let top = y * sat_width;
                        let bottom = (y + template) * sat_width;
                        let ssd = sat[bottom + x + template] - sat[top + x + template]
                            - sat[bottom + x]
                            + sat[top + x];
                        let weight = (-(ssd.max(0.0) / normalization)).exp() as f32;

                        let qx = ((pad + x) as isize + dx) as usize;
                        let q = qy * padded_width + qx;
                        let cell = &mut row[x * stride..(x + 1) * stride];
                        for (channel, plane) in padded.iter().enumerate() {
                            cell[channel] += weight * plane[q];
                        }
                        cell[channels] += weight;
                    }
                };

                #[cfg(feature = "rayon")]
                accumulator
                    .par_chunks_mut(width * stride)
                    .enumerate()
                    .for_each(accumulate_row);

                #[cfg(not(feature = "rayon"))]
                accumulator
                    .chunks_mut(width * stride)
                    .enumerate()
                    .for_each(accumulate_row);
            }
        }

        (0..channels)
            .map(|channel| {
                accumulator
                    .chunks_exact(stride)
                    .map(|cell| cell[channel] / cell[channels])
                    .collect()
            })
            .collect()
    }

    fn reflect_pad(&self, pad: usize) -> Vec<Vec<f32>> {
        let padded_width = self.width + 2 * pad;
        let padded_height = self.height + 2 * pad;
        self.planes
            .iter()
            .map(|plane| {
                let mut padded = Vec::with_capacity(padded_width * padded_height);
                for py in 0..padded_height {
                    let y = reflect_101(py as i64 - pad as i64, self.height);
                    for px in 0..padded_width {
                        let x = reflect_101(px as i64 - pad as i64, self.width);
                        padded.push(plane[y * self.width + x]);
                    }
                }
                padded
            })
            .collect()
    }
}
