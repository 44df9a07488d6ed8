//! Decode, resize and encode through the `image` crate

use crate::error::TransformError;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Decode a staged file's bytes, guessing the format from its content
pub(crate) fn decode(bytes: &[u8], path: &Path) -> Result<DynamicImage, TransformError> {
    image::load_from_memory(bytes).map_err(|e| TransformError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Output format for a source: from its extension, else from its content
pub(crate) fn output_format(bytes: &[u8], path: &Path) -> Result<ImageFormat, TransformError> {
    ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map_err(|e| TransformError::Decode {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Resize to exactly `width` x `height` with Lanczos3
pub(crate) fn resize(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode `image` in `format`
///
/// JPEG has no alpha channel or 16-bit support, so those images are
/// flattened to 8-bit RGB first.
pub(crate) fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    path: &Path,
) -> Result<Vec<u8>, TransformError> {
    let mut buffer = Cursor::new(Vec::new());
    let result = if format == ImageFormat::Jpeg && !matches!(image, DynamicImage::ImageRgb8(_)) {
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format)
    } else {
        image.write_to(&mut buffer, format)
    };

    result.map_err(|e| TransformError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(buffer.into_inner())
}
