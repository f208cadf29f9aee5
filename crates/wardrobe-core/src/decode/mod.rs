//! Image decoding for the fitting room.
//!
//! This module provides functionality for:
//! - Decoding garment cut-outs (PNG with alpha) and still frames
//! - Resizing rasters when frame and export surface sizes differ
//!
//! Everything works on [`Raster`], a straight-alpha RGBA buffer.
//! All operations are synchronous and single-threaded within WASM.

mod load;
mod resize;
mod types;

pub use load::decode_image;
pub use resize::resize;
pub use types::{DecodeError, FilterType, Raster};
