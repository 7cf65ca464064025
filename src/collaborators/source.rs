use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::{debug, warn};

use crate::error::SourceError;

/// Supplier of input images (generator backend, local file, upload, ...).
pub trait ImageSource {
    /// Produces a decoded image.
    ///
    /// # Errors
    ///
    /// * `SourceError` - When the image is missing, unreadable or undecodable
    fn load(&self) -> Result<DynamicImage, SourceError>;
}

impl<S: ImageSource + ?Sized> ImageSource for Box<S> {
    fn load(&self) -> Result<DynamicImage, SourceError> {
        (**self).load()
    }
}

/// Image read from a file, format guessed from the content.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageSource for FileSource {
    fn load(&self) -> Result<DynamicImage, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound {
                path: self.path.clone(),
            });
        }
        let image = ImageReader::open(&self.path)?
            .with_guessed_format()?
            .decode()?;
        debug!(path = %self.path.display(), width = image.width(), height = image.height(), "loaded image file");
        Ok(image)
    }
}

/// Encoded image held in memory, e.g. an upload or an API response body.
#[derive(Debug, Clone)]
pub struct MemorySource {
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ImageSource for MemorySource {
    fn load(&self) -> Result<DynamicImage, SourceError> {
        Ok(image::load_from_memory(&self.bytes)?)
    }
}

/// Already decoded image.
#[derive(Debug, Clone)]
pub struct StaticSource {
    image: DynamicImage,
}

impl StaticSource {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl ImageSource for StaticSource {
    fn load(&self) -> Result<DynamicImage, SourceError> {
        Ok(self.image.clone())
    }
}

/// Prioritized list of sources tried in order.
///
/// The first source that succeeds wins. When every source fails, the returned
/// [`SourceError::Exhausted`] holds each failure in priority order.
#[derive(Default)]
pub struct FallbackSource {
    sources: Vec<Box<dyn ImageSource + Send + Sync>>,
}

impl FallbackSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source with lower priority than all previous ones.
    #[must_use]
    pub fn then(mut self, source: impl ImageSource + Send + Sync + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl ImageSource for FallbackSource {
    fn load(&self) -> Result<DynamicImage, SourceError> {
        if self.sources.is_empty() {
            return Err(SourceError::NoSources);
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (priority, source) in self.sources.iter().enumerate() {
            match source.load() {
                Ok(image) => return Ok(image),
                Err(err) => {
                    warn!(priority, error = %err, "image source failed, trying next");
                    failures.push(err);
                }
            }
        }
        Err(SourceError::Exhausted(failures))
    }
}
