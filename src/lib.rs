//! Sticker production from raw images.
//!
//! A sticker is a fixed-size transparent PNG holding a single subject. The
//! crate takes a decoded image and a segmentation model and produces one:
//!
//! 1. the model yields a rough foreground mask,
//! 2. the mask is cleaned (islands removed, edges eroded) and smoothed,
//! 3. the colour image is denoised and composited with the mask,
//! 4. the cutout is scaled onto a transparent canvas, centred.
//!
//! Each stage is also available on its own as an extension trait on the
//! `image` buffer types, in the same style as [`image::imageops`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use sticker_kit::{AlphaChannelSegmenter, StickerParameters, StickerPipeline};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let image = image::open("character.png")?;
//! let segmenter = AlphaChannelSegmenter::from_image(&image)?;
//! let pipeline = StickerPipeline::new(Arc::new(segmenter), StickerParameters::default())?;
//! let sticker = pipeline.process(&image)?;
//! sticker.save("sticker.png")?;
//! # Ok(())
//! # }
//! ```

mod collaborators;
mod error;
mod params;
mod pipeline;
mod sticker_kit;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use collaborators::delivery::{encode_png, Delivery, MemoryDelivery, PngFileDelivery};
pub use collaborators::segmenter::{AlphaChannelSegmenter, Segmenter};
pub use collaborators::source::{FallbackSource, FileSource, ImageSource, MemorySource, StaticSource};
pub use error::{
    AlphaMaskError, DeliveryError, FitError, MaskError, NLMeansError, PaddingError, SegmentError,
    SourceError, StickerError,
};
pub use params::StickerParameters;
pub use pipeline::StickerPipeline;
pub use sticker_kit::alpha_premultiply::PremultiplyAlphaExt;
pub use sticker_kit::apply_alpha_mask::{ApplyAlphaMaskExt, ModifyAlphaExt};
pub use sticker_kit::clean_mask::{CleanMaskExt, RegionAreas, RemoveIslandsExt, BINARIZE_THRESHOLD};
pub use sticker_kit::erode::{ErodeMaskExt, SquareKernel};
pub use sticker_kit::fit_canvas::{fitted_size, FitCanvasExt, FitMode};
pub use sticker_kit::nlmeans::{NLMeansExt, NlMeansParams};
pub use sticker_kit::padding::{centered_position, PaddingExt};
pub use sticker_kit::smooth_edges::SmoothEdgesExt;
pub use sticker_kit::transparency::{has_transparency, TransparencyExt};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
