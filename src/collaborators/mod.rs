//! Seams to the systems around the sticker pipeline.
//!
//! Image generation, segmentation models and storage live outside this crate.
//! The traits here are what the pipeline expects of them; the concrete types
//! cover the local cases (files, memory buffers, existing alpha channels).

pub mod delivery;
pub mod segmenter;
pub mod source;
