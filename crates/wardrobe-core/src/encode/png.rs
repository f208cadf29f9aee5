//! PNG encoding for exported looks.
//!
//! This module provides PNG encoding using the `image` crate's PNG encoder
//! and the `data:` URL form the page uses for downloads and the history strip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::Raster;

/// MIME type of every exported artifact.
pub const PNG_MIME: &str = "image/png";

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGBA raster to PNG bytes.
///
/// # Returns
///
/// PNG-encoded bytes on success, or an error if the raster is empty,
/// inconsistent, or the encoder fails.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (raster.width, raster.height);

    // Validate dimensions
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    // Validate pixel data length
    let expected_len = (width as usize) * (height as usize) * 4;
    if raster.pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: raster.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(&raster.pixels, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Render PNG bytes as a self-contained `data:image/png;base64,...` URL.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:{};base64,{}", PNG_MIME, STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_encode_png_basic() {
        let raster = Raster::filled(100, 100, [128, 128, 128, 255]);

        let png = encode_png(&raster).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_encode_png_invalid_pixel_data_short() {
        let raster = Raster {
            width: 100,
            height: 100,
            pixels: vec![128u8; 99 * 100 * 4], // One row short
        };

        let result = encode_png(&raster);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_png_zero_width() {
        let raster = Raster::transparent(0, 100);

        let result = encode_png(&raster);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_png_zero_height() {
        let raster = Raster::transparent(100, 0);

        let result = encode_png(&raster);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_encode_png_small_image() {
        // 1x1 pixel image
        let raster = Raster::filled(1, 1, [255, 0, 0, 255]);

        let png = encode_png(&raster).unwrap();
        assert_eq!(&png[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_data_url_prefix() {
        let png = encode_png(&Raster::filled(2, 2, [0, 0, 0, 255])).unwrap();
        let url = to_data_url(&png);

        assert!(url.starts_with("data:image/png;base64,"));
        // base64 of the PNG signature
        assert!(url["data:image/png;base64,".len()..].starts_with("iVBORw0KGgo"));
    }

    #[test]
    fn test_data_url_of_known_bytes() {
        assert_eq!(to_data_url(b"abc"), "data:image/png;base64,YWJj");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
