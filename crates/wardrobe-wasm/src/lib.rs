//! Mood Wardrobe WASM - WebAssembly bindings for the fitting room
//!
//! This crate exposes the wardrobe-core session to the browser page. The
//! page keeps the `<video>`, `<img>` and slider elements; everything that
//! decides where the garment goes and what ends up in the PNG lives here.
//!
//! # Module Structure
//!
//! - `room` - The fitting-room session: transform, catalog, export, history
//! - `camera` - Camera stream ownership and localized error messages
//! - `types` - WASM-compatible wrapper types for image data
//! - `logger` - `log` records forwarded to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsFittingRoom, JsCameraSession } from '@mood-wardrobe/wasm';
//!
//! await init();
//!
//! const room = new JsFittingRoom();
//! room.set_field('scale', 1.2);
//! const style = room.overlay_style(rect.width, rect.height, img.naturalHeight / img.naturalWidth);
//! overlay.style.transform = style.transform;
//! ```

use wasm_bindgen::prelude::*;

mod camera;
mod logger;
mod room;
mod types;

// Re-export public types
pub use camera::{camera_constraints, camera_error_message, JsCameraSession};
pub use room::{JsExportedLook, JsFittingRoom, JsPendingExport};
pub use types::{decode_image, JsRaster};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install();
    log::info!("mood wardrobe {} ready", wardrobe_core::VERSION);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    wardrobe_core::VERSION.to_string()
}
