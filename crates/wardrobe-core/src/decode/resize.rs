//! Raster resizing.
//!
//! Used when the export surface and the camera frame disagree on size, e.g.
//! when the native frame size is unknown and the surface falls back to the
//! rendered box size.

use super::{DecodeError, FilterType, Raster};

/// Resize a raster to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if a target dimension is zero, and
/// `DecodeError::InvalidPixelData` if the source buffer is inconsistent.
pub fn resize(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba_image = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::InvalidPixelData {
            expected: (image.width as usize) * (image.height as usize) * 4,
            actual: image.pixels.len(),
        })?;

    let resized = image::imageops::resize(&rgba_image, width, height, filter.to_image_filter());

    Ok(Raster::from_rgba_image(resized))
}
