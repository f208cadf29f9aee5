//! Garment and frame decoding from encoded image bytes.

use std::io::Cursor;

use image::ImageReader;

use super::{DecodeError, Raster};

/// Decode an encoded image (PNG or JPEG) into an RGBA raster.
///
/// Garment cut-outs are PNGs with an alpha channel, so the alpha is kept.
/// Formats without alpha decode as fully opaque.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be guessed,
/// `DecodeError::CorruptedFile` if decoding fails, and
/// `DecodeError::EmptyImage` if the image has no pixels.
pub fn decode_image(bytes: &[u8]) -> Result<Raster, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let raster = Raster::from_rgba_image(img.into_rgba8());
    if raster.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: raster.width,
            height: raster.height,
        });
    }

    log::debug!("decoded {}x{} image", raster.width, raster.height);
    Ok(raster)
}
