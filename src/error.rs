use std::path::PathBuf;

use thiserror::Error;

/// Error type for mask refinement operations
///
/// Covers island removal, erosion and edge smoothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// The mask has zero width or height
    #[error("Mask dimensions must be non-zero, got {width}x{height}")]
    EmptyMask { width: u32, height: u32 },

    /// Invalid parameter provided to the operation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Error type for Non-Local Means denoising
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NLMeansError {
    /// Filtering strength must be positive and finite
    #[error("Filtering parameter h must be positive, got {h}")]
    InvalidFilteringParameter { h: f32 },

    /// Window sizes must be odd positive integers
    #[error("Window size must be an odd positive integer, got {size}")]
    InvalidWindowSize { size: u32 },

    /// The search window must be larger than the template window
    #[error("Search window ({search_window}) must be larger than template window ({template_window})")]
    InvalidWindowSizes {
        template_window: u32,
        search_window: u32,
    },

    /// The image has zero width or height
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Error type for alpha mask operations
///
/// This error type covers failures that can occur when merging
/// a mask into the alpha channel of a colour image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphaMaskError {
    /// Image and mask dimensions do not match
    ///
    /// This error occurs when attempting to apply an alpha mask
    /// to an image where the dimensions don't align properly.
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for padding operations
///
/// This error type represents failures that can occur when placing
/// an image onto a larger canvas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaddingError {
    /// Padding width is smaller than the image width
    #[error("Padding width ({pad_width}) must be greater than or equal to image width ({width})")]
    PaddingWidthTooSmall { width: u32, pad_width: u32 },

    /// Padding height is smaller than the image height
    #[error(
        "Padding height ({pad_height}) must be greater than or equal to image height ({height})"
    )]
    PaddingHeightTooSmall { height: u32, pad_height: u32 },
}

/// Error type for canvas fitting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FitError {
    /// The source image has zero width or height
    #[error("Source image is empty: {width}x{height}")]
    EmptySourceImage { width: u32, height: u32 },

    /// The target canvas has zero width or height
    #[error("Target dimensions must be positive, got {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// The resized content does not fit the canvas
    #[error(transparent)]
    Padding(#[from] PaddingError),
}

/// Error reported by a [`Segmenter`](crate::Segmenter)
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The image carries no usable transparency to derive a mask from
    #[error("Image has no transparent pixels to derive a mask from")]
    NoTransparency,

    /// The segmentation backend failed
    #[error("Segmentation backend failed: {0}")]
    Backend(String),
}

/// Error reported by an [`ImageSource`](crate::ImageSource)
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source path does not exist
    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The source could not be read
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The source bytes are not a decodable image
    #[error("Failed to decode input image: {0}")]
    Decode(#[from] image::ImageError),

    /// Every source of a fallback chain failed, in priority order
    #[error("All {} image sources failed", .0.len())]
    Exhausted(Vec<SourceError>),

    /// The fallback chain has no sources
    #[error("No image sources configured")]
    NoSources,
}

/// Error reported by a [`Delivery`](crate::Delivery)
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Writing the sticker failed
    #[error("Failed to write sticker: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding the sticker failed
    #[error("Failed to encode sticker: {0}")]
    Encode(#[from] image::ImageError),
}

/// Error type for the sticker pipeline
///
/// Every stage failure is mapped onto one of these variants and reported
/// to the caller; nothing is retried.
#[derive(Debug, Error)]
pub enum StickerError {
    /// The source image or mask is missing or unreadable
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// The input exists but is not a decodable image
    #[error("Failed to decode input image: {0}")]
    Decode(String),

    /// Colour image and mask sizes disagree
    #[error("Dimension mismatch: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// A configuration or operation parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The image to fit has zero width or height
    #[error("Source image is empty: {width}x{height}")]
    EmptySourceImage { width: u32, height: u32 },

    /// The segmenter failed to produce a mask
    #[error(transparent)]
    Segmentation(#[from] SegmentError),

    /// The finished sticker could not be delivered
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl From<MaskError> for StickerError {
    fn from(err: MaskError) -> Self {
        match err {
            MaskError::EmptyMask { width, height } => Self::EmptySourceImage { width, height },
            MaskError::InvalidParameter(message) => Self::InvalidParameter(message),
        }
    }
}

impl From<NLMeansError> for StickerError {
    fn from(err: NLMeansError) -> Self {
        match err {
            NLMeansError::EmptyImage { width, height } => Self::EmptySourceImage { width, height },
            other => Self::InvalidParameter(other.to_string()),
        }
    }
}

impl From<AlphaMaskError> for StickerError {
    fn from(err: AlphaMaskError) -> Self {
        let AlphaMaskError::DimensionMismatch { expected, actual } = err;
        Self::DimensionMismatch { expected, actual }
    }
}

impl From<FitError> for StickerError {
    fn from(err: FitError) -> Self {
        match err {
            FitError::EmptySourceImage { width, height } => Self::EmptySourceImage { width, height },
            other => Self::InvalidParameter(other.to_string()),
        }
    }
}

impl From<SourceError> for StickerError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound { path } => Self::InputNotFound(path.display().to_string()),
            SourceError::Io(e) => Self::InputNotFound(e.to_string()),
            SourceError::Decode(e) => Self::Decode(e.to_string()),
            other @ (SourceError::Exhausted(_) | SourceError::NoSources) => {
                Self::InputNotFound(other.to_string())
            }
        }
    }
}
