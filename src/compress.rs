//! Client-side image compression.
//!
//! Decodes an arbitrary raster image, scales it down to a maximum width while
//! preserving the aspect ratio, and re-encodes it as lossy WebP. Decoding and
//! encoding run on the blocking pool so callers simply `.await` the result.

use std::io::Write;

use bytes::Bytes;
use image::imageops::FilterType;
use tracing::debug;
use wardrobe_common::{Error, Result};

use crate::config::CompressionConfig;

/// MIME type of every compressed image.
pub const WEBP_MIME: &str = "image/webp";

/// File extension matching [`WEBP_MIME`].
pub const WEBP_EXTENSION: &str = "webp";

/// A compressed image ready for upload and analysis.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    data: Bytes,
    width: u32,
    height: u32,
}

impl CompressedImage {
    /// Wrap already-compressed WebP bytes (e.g. downloaded from storage).
    pub fn from_webp(data: Bytes, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime_type(&self) -> &'static str {
        WEBP_MIME
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the image to a temporary file for local preview.
    ///
    /// The file is removed when the returned path is dropped.
    pub fn write_preview(&self) -> std::io::Result<tempfile::TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("wardrobe-preview-")
            .suffix(&format!(".{WEBP_EXTENSION}"))
            .tempfile()?;
        file.write_all(&self.data)?;
        file.flush()?;
        Ok(file.into_temp_path())
    }
}

/// Downsizes and re-encodes photos before upload.
#[derive(Debug, Clone, Copy)]
pub struct ImageCompressor {
    max_width: u32,
    quality: f32,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::from_config(&CompressionConfig::default())
    }
}

impl ImageCompressor {
    /// Create a compressor. `quality` is in (0, 1].
    pub fn new(max_width: u32, quality: f32) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(0.01, 1.0),
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        Self::new(config.max_width, config.quality)
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Compress without blocking the async runtime.
    pub async fn compress(&self, data: Bytes) -> Result<CompressedImage> {
        let compressor = *self;
        tokio::task::spawn_blocking(move || compressor.compress_blocking(&data))
            .await
            .map_err(|e| Error::Encode(format!("compression task failed: {e}")))?
    }

    /// Decode, resize, and encode on the current thread.
    pub fn compress_blocking(&self, data: &[u8]) -> Result<CompressedImage> {
        if data.is_empty() {
            return Err(Error::decode("input is empty"));
        }

        let img = image::load_from_memory(data).map_err(|e| Error::decode(e.to_string()))?;

        let (width, height) = target_dimensions(img.width(), img.height(), self.max_width);
        let img = if (width, height) != (img.width(), img.height()) {
            debug!(
                from_width = img.width(),
                from_height = img.height(),
                width,
                height,
                "Resizing image"
            );
            img.resize_exact(width, height, FilterType::Lanczos3)
        } else {
            img
        };

        let rgba = img.to_rgba8();
        let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, self.quality * 100.0)
            .map_err(|e| Error::Encode(format!("WebP encoding failed: {e:?}")))?;

        let data = Bytes::copy_from_slice(&encoded);
        debug!(bytes = data.len(), width, height, "Compressed image");

        Ok(CompressedImage {
            data,
            width,
            height,
        })
    }
}

/// Output dimensions for an image of `width`×`height` capped at `max_width`.
///
/// Images at or below the cap keep their size; wider ones are scaled so the
/// width equals the cap and the height follows proportionally (rounded, at
/// least one pixel).
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    (max_width, (scaled as u32).max(1))
}
