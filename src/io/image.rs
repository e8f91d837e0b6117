//! Image file decoding and PNG export

use crate::io::error::{CodecError, Result};
use crate::spatial::pixels::PixelBuffer;
use image::RgbaImage;
use std::path::Path;

/// Decode any format supported by the `image` crate into RGBA pixels
///
/// # Errors
///
/// Returns an error if the file cannot be opened or decoded
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let img = image::open(path).map_err(|e| CodecError::ImageLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();
    PixelBuffer::from_raw(width as usize, height as usize, rgba_img.into_raw())
}

/// Convert a pixel buffer into an `image` crate RGBA image
///
/// # Errors
///
/// Returns an error if the dimensions do not fit the `image` crate limits
pub fn to_rgba_image(buffer: &PixelBuffer) -> Result<RgbaImage> {
    let (width, height) = u32::try_from(buffer.width())
        .ok()
        .zip(u32::try_from(buffer.height()).ok())
        .ok_or_else(|| oversized(buffer))?;
    RgbaImage::from_raw(width, height, buffer.as_raw().to_vec()).ok_or_else(|| oversized(buffer))
}

/// Save a pixel buffer as PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_image(buffer: &PixelBuffer, output_path: &Path) -> Result<()> {
    let img = to_rgba_image(buffer)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CodecError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    img.save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| CodecError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}

fn oversized(buffer: &PixelBuffer) -> CodecError {
    CodecError::InvalidSourceData {
        reason: format!(
            "{}x{} image cannot be exported",
            buffer.width(),
            buffer.height()
        ),
    }
}
