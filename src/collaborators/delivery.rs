use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::DeliveryError;

/// Receiver of finished stickers.
pub trait Delivery {
    /// Persists or forwards the sticker.
    ///
    /// # Errors
    ///
    /// * `DeliveryError` - When the sticker cannot be encoded or written
    fn deliver(&self, sticker: &RgbaImage) -> Result<(), DeliveryError>;
}

/// Encodes a sticker as PNG, the lossless transparent format stickers ship in.
///
/// # Errors
///
/// * `DeliveryError::Encode` - When encoding fails
pub fn encode_png(sticker: &RgbaImage) -> Result<Vec<u8>, DeliveryError> {
    let mut buffer = Cursor::new(Vec::new());
    sticker.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Writes stickers to a PNG file.
///
/// Missing parent directories are created. The PNG is written to a temporary
/// file next to the destination and renamed into place, so a failed write
/// never leaves a partial file at the destination.
#[derive(Debug, Clone)]
pub struct PngFileDelivery {
    path: PathBuf,
}

impl PngFileDelivery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Delivery for PngFileDelivery {
    fn deliver(&self, sticker: &RgbaImage) -> Result<(), DeliveryError> {
        let encoded = encode_png(sticker)?;

        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory)?;

        let mut staging = NamedTempFile::new_in(&directory)?;
        staging.write_all(&encoded)?;
        staging.flush()?;
        staging.persist(&self.path).map_err(|e| e.error)?;

        info!(
            path = %self.path.display(),
            width = sticker.width(),
            height = sticker.height(),
            "sticker written"
        );
        Ok(())
    }
}

/// Collects stickers in memory as PNG bytes.
#[derive(Debug, Default)]
pub struct MemoryDelivery {
    stickers: std::sync::Mutex<Vec<Vec<u8>>>,
}

impl MemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// PNG bytes of every delivered sticker, in delivery order.
    pub fn take(&self) -> Vec<Vec<u8>> {
        match self.stickers.lock() {
            Ok(mut stickers) => std::mem::take(&mut *stickers),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Delivery for MemoryDelivery {
    fn deliver(&self, sticker: &RgbaImage) -> Result<(), DeliveryError> {
        let encoded = encode_png(sticker)?;
        match self.stickers.lock() {
            Ok(mut stickers) => stickers.push(encoded),
            Err(poisoned) => poisoned.into_inner().push(encoded),
        }
        Ok(())
    }
}
