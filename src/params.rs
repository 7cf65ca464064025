use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StickerError;
use crate::sticker_kit::fit_canvas::FitMode;
use crate::sticker_kit::nlmeans::NlMeansParams;

/// Configuration of one sticker pipeline.
///
/// Deserializing fills missing fields with their defaults, so a JSON document
/// only needs to name the values it changes:
///
/// ```no_run
/// use sticker_kit::StickerParameters;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = StickerParameters::from_json_str(r#"{ "island_min_area": 100 }"#)?;
/// assert_eq!(params.erosion_size, 1);
/// assert_eq!(params.island_min_area, 100);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerParameters {
    /// Pixels shaved off the mask edge to remove background halo; 0 disables erosion
    pub erosion_size: u32,
    /// Regions of at most this many pixels are removed from the mask
    pub island_min_area: u32,
    /// Width of the output canvas
    pub target_width: u32,
    /// Height of the output canvas
    pub target_height: u32,
    /// Whether images smaller than the canvas are scaled up
    pub fit_mode: FitMode,
    /// Use the alpha channel of inputs that already have transparency instead of segmenting them
    pub reuse_existing_alpha: bool,
    /// Colour denoiser settings
    pub denoise: NlMeansParams,
}

impl Default for StickerParameters {
    fn default() -> Self {
        Self {
            erosion_size: 1,
            island_min_area: 50,
            target_width: 370,
            target_height: 320,
            fit_mode: FitMode::default(),
            reuse_existing_alpha: false,
            denoise: NlMeansParams::default(),
        }
    }
}

impl StickerParameters {
    /// Creates parameters with the given core values and defaults for the rest.
    ///
    /// # Errors
    ///
    /// * `StickerError::InvalidParameter` - When a target dimension is zero
    pub fn new(
        erosion_size: u32,
        island_min_area: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<Self, StickerError> {
        let params = Self {
            erosion_size,
            island_min_area,
            target_width,
            target_height,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    #[must_use]
    pub const fn with_erosion_size(mut self, erosion_size: u32) -> Self {
        self.erosion_size = erosion_size;
        self
    }

    #[must_use]
    pub const fn with_island_min_area(mut self, island_min_area: u32) -> Self {
        self.island_min_area = island_min_area;
        self
    }

    #[must_use]
    pub const fn with_target_size(mut self, target_width: u32, target_height: u32) -> Self {
        self.target_width = target_width;
        self.target_height = target_height;
        self
    }

    #[must_use]
    pub const fn with_fit_mode(mut self, fit_mode: FitMode) -> Self {
        self.fit_mode = fit_mode;
        self
    }

    #[must_use]
    pub const fn with_reuse_existing_alpha(mut self, reuse_existing_alpha: bool) -> Self {
        self.reuse_existing_alpha = reuse_existing_alpha;
        self
    }

    #[must_use]
    pub const fn with_denoise(mut self, denoise: NlMeansParams) -> Self {
        self.denoise = denoise;
        self
    }

    /// Checks the values that the type system cannot rule out.
    ///
    /// # Errors
    ///
    /// * `StickerError::InvalidParameter` - When a target dimension is zero or the
    ///   denoiser settings are invalid
    pub fn validate(&self) -> Result<(), StickerError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(StickerError::InvalidParameter(format!(
                "target dimensions must be positive, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        self.denoise
            .validate()
            .map_err(|e| StickerError::InvalidParameter(e.to_string()))
    }

    /// Parses and validates parameters from JSON.
    ///
    /// # Errors
    ///
    /// * `StickerError::InvalidParameter` - When the document is malformed, holds
    ///   negative or non-integer sizes, or fails [`validate`](Self::validate)
    pub fn from_json_str(json: &str) -> Result<Self, StickerError> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| StickerError::InvalidParameter(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Reads parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// * `StickerError::InputNotFound` - When the file cannot be read
    /// * Any error of [`from_json_str`](Self::from_json_str)
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StickerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StickerError::InputNotFound(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }
}
