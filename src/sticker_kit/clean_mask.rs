use image::{GrayImage, Luma};
use imageproc::{
    definitions::Image,
    map::map_colors,
    region_labelling::{connected_components, Connectivity},
};
use tracing::debug;

use crate::error::MaskError;
use crate::sticker_kit::erode::{ErodeMaskExt, SquareKernel};
use crate::utils::validate_non_empty_image;

/// Mask values above this threshold count as foreground when looking for islands.
///
/// Low-confidence segmentation noise at or below it never forms a region.
pub const BINARIZE_THRESHOLD: u8 = 10;

/// Area statistics of the 8-connected foreground regions of a mask.
#[derive(Debug, Clone)]
pub struct RegionAreas {
    labels: Image<Luma<u32>>,
    areas: Vec<u32>,
}

impl RegionAreas {
    /// Labels the foreground regions of `mask` after binarizing it at
    /// [`BINARIZE_THRESHOLD`].
    pub fn from_mask(mask: &GrayImage) -> Self {
        // connected_components cannot label a single-pixel image
        if mask.dimensions() == (1, 1) {
            let foreground = mask.get_pixel(0, 0)[0] > BINARIZE_THRESHOLD;
            let labels = Image::from_pixel(1, 1, Luma([u32::from(foreground)]));
            let areas = if foreground { vec![0, 1] } else { vec![0] };
            return Self { labels, areas };
        }

        let binary = map_colors(mask, |Luma([value])| {
            Luma([if value > BINARIZE_THRESHOLD { 255u8 } else { 0 }])
        });
        let labels = connected_components(&binary, Connectivity::Eight, Luma([0u8]));

        let region_count = labels.pixels().map(|p| p[0]).max().unwrap_or(0) as usize;
        let mut areas = vec![0u32; region_count + 1];
        for Luma([label]) in labels.pixels() {
            areas[*label as usize] += 1;
        }
        // Label 0 is background
        areas[0] = 0;

        Self { labels, areas }
    }

    /// Number of foreground regions.
    pub fn region_count(&self) -> usize {
        self.areas.len() - 1
    }

    /// Pixel counts of the foreground regions, ordered by label.
    pub fn areas(&self) -> &[u32] {
        &self.areas[1..]
    }

    /// Per-pixel region labels, 0 for background.
    pub fn labels(&self) -> &Image<Luma<u32>> {
        &self.labels
    }
}

/// Trait for removing small disconnected regions ("islands") from a mask.
pub trait RemoveIslandsExt {
    /// Zeroes every 8-connected region whose area is at most `min_area` pixels.
    ///
    /// Surviving regions keep their original, non-binarized mask values.
    /// Pixels at or below [`BINARIZE_THRESHOLD`] belong to no region and are zeroed.
    ///
    /// This consumes the original mask.
    ///
    /// # Errors
    ///
    /// * `MaskError::EmptyMask` - When the mask has zero width or height
    fn remove_islands(self, min_area: u32) -> Result<GrayImage, MaskError>;
}

impl RemoveIslandsExt for GrayImage {
    fn remove_islands(mut self, min_area: u32) -> Result<GrayImage, MaskError> {
        let (width, height) = self.dimensions();
        validate_non_empty_image(width, height, "RemoveIslands")
            .map_err(|_| MaskError::EmptyMask { width, height })?;

        let regions = RegionAreas::from_mask(&self);
        let keep: Vec<bool> = std::iter::once(false)
            .chain(regions.areas().iter().map(|&area| area > min_area))
            .collect();

        self.pixels_mut()
            .zip(regions.labels().pixels())
            .for_each(|(pixel, Luma([label]))| {
                if !keep[*label as usize] {
                    *pixel = Luma([0]);
                }
            });

        debug!(
            regions = regions.region_count(),
            removed = keep.iter().skip(1).filter(|kept| !**kept).count(),
            min_area,
            "removed mask islands"
        );

        Ok(self)
    }
}

/// Trait for the full mask cleaning step: island removal followed by halo erosion.
pub trait CleanMaskExt {
    /// Removes islands of at most `island_min_area` pixels, then erodes the
    /// mask with a square kernel of side `erosion_size + 1`.
    ///
    /// An `erosion_size` of 0 skips erosion, which keeps fine details such as
    /// hair strands at the cost of a possible halo.
    ///
    /// # Errors
    ///
    /// * `MaskError::EmptyMask` - When the mask has zero width or height
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sticker_kit::CleanMaskExt;
    /// use image::GrayImage;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let rough_mask = GrayImage::new(100, 100);
    /// let cleaned = rough_mask.clean_mask(50, 1)?;
    /// # Ok(())
    /// # }
    /// ```
    fn clean_mask(self, island_min_area: u32, erosion_size: u32) -> Result<GrayImage, MaskError>;
}

impl CleanMaskExt for GrayImage {
    fn clean_mask(self, island_min_area: u32, erosion_size: u32) -> Result<GrayImage, MaskError> {
        let cleaned = self.remove_islands(island_min_area)?;
        if erosion_size == 0 {
            return Ok(cleaned);
        }
        Ok(cleaned.erode_mask(SquareKernel::for_erosion_size(erosion_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{count_opaque, draw_block};

    #[test]
    fn region_areas_counts_eight_connected_regions() {
        let mut mask = GrayImage::new(10, 10);
        draw_block(&mut mask, 0, 0, 3, 3, 255);
        // Diagonal neighbours join one region
        mask.put_pixel(3, 3, Luma([255]));
        mask.put_pixel(4, 4, Luma([255]));
        draw_block(&mut mask, 7, 7, 2, 1, 255);

        let regions = RegionAreas::from_mask(&mask);

        assert_eq!(regions.region_count(), 2);
        let mut areas = regions.areas().to_vec();
        areas.sort_unstable();
        assert_eq!(areas, vec![2, 11]);
    }

    #[test]
    fn single_pixel_masks_are_labelled() {
        let opaque = GrayImage::from_pixel(1, 1, Luma([255]));
        let regions = RegionAreas::from_mask(&opaque);
        assert_eq!(regions.region_count(), 1);
        assert_eq!(regions.areas(), &[1]);
        assert_eq!(regions.labels().get_pixel(0, 0)[0], 1);

        let faint = GrayImage::from_pixel(1, 1, Luma([BINARIZE_THRESHOLD]));
        let regions = RegionAreas::from_mask(&faint);
        assert_eq!(regions.region_count(), 0);
        assert_eq!(regions.labels().get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn single_pixel_mask_is_cleaned_like_any_other() {
        let opaque = GrayImage::from_pixel(1, 1, Luma([255]));

        assert_eq!(opaque.clone().clean_mask(0, 0).unwrap(), opaque);
        assert_eq!(opaque.clone().clean_mask(0, 3).unwrap(), opaque);
        let removed = opaque.clean_mask(1, 0).unwrap();
        assert_eq!(removed.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn low_values_do_not_form_regions() {
        let mut mask = GrayImage::new(6, 6);
        draw_block(&mut mask, 0, 0, 6, 6, BINARIZE_THRESHOLD);

        let regions = RegionAreas::from_mask(&mask);
        assert_eq!(regions.region_count(), 0);

        let cleaned = mask.remove_islands(0).unwrap();
        assert!(cleaned.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn remove_islands_keeps_original_values_of_survivors() {
        let mut mask = GrayImage::new(20, 20);
        draw_block(&mut mask, 2, 2, 10, 10, 180);
        mask.put_pixel(5, 5, Luma([60]));
        draw_block(&mut mask, 16, 16, 2, 2, 255);

        let cleaned = mask.remove_islands(10).unwrap();

        assert_eq!(cleaned.get_pixel(3, 3)[0], 180);
        assert_eq!(cleaned.get_pixel(5, 5)[0], 60);
        assert_eq!(cleaned.get_pixel(16, 16)[0], 0);
        assert_eq!(count_opaque(&cleaned, 1), 100);
    }

    #[test]
    fn island_of_exactly_min_area_is_removed() {
        let mut mask = GrayImage::new(30, 30);
        draw_block(&mut mask, 0, 0, 10, 10, 255);

        let kept = mask.clone().remove_islands(99).unwrap();
        assert_eq!(count_opaque(&kept, 1), 100);

        let removed = mask.clone().remove_islands(100).unwrap();
        assert_eq!(count_opaque(&removed, 1), 0);

        let kept_at_fifty = mask.clone().remove_islands(50).unwrap();
        assert_eq!(count_opaque(&kept_at_fifty, 1), 100);
        let removed_at_two_hundred = mask.remove_islands(200).unwrap();
        assert_eq!(count_opaque(&removed_at_two_hundred, 1), 0);
    }

    #[test]
    fn opaque_mask_survives_unchanged_without_erosion() {
        let mask = GrayImage::from_pixel(16, 12, Luma([255]));
        let cleaned = mask.clone().clean_mask(0, 0).unwrap();
        assert_eq!(cleaned, mask);
    }

    #[test]
    fn clean_mask_erodes_after_island_removal() {
        let mut mask = GrayImage::new(20, 20);
        draw_block(&mut mask, 5, 5, 10, 10, 255);
        mask.put_pixel(0, 19, Luma([255]));

        let cleaned = mask.clean_mask(1, 1).unwrap();

        assert_eq!(cleaned.get_pixel(0, 19)[0], 0);
        assert_eq!(count_opaque(&cleaned, 1), 81);
    }

    #[test]
    fn empty_mask_is_rejected() {
        let mask = GrayImage::new(0, 4);
        assert_eq!(
            mask.clean_mask(0, 0),
            Err(MaskError::EmptyMask {
                width: 0,
                height: 4
            })
        );
    }
}
