//! Typed sizes for the two coordinate spaces the fitting room works in.
//!
//! - **Preview box space**: the camera element as rendered on the page, in
//!   CSS pixels. Fractional sizes are normal here.
//! - **Native frame space**: the camera sensor's pixel grid, which is also
//!   the pixel grid of the exported raster.
//!
//! The two are deliberately separate types. Converting between them goes
//! through [`SpaceRatio`], which is only constructible from one of each.

use serde::{Deserialize, Serialize};

/// Size of the on-screen preview box, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewGeometry {
    pub width: f64,
    pub height: f64,
}

impl PreviewGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// The box size rounded to whole pixels, as a native-space size.
    ///
    /// This is the export surface size when the camera does not report its
    /// own frame size yet.
    pub fn rounded(&self) -> NativeGeometry {
        let round = |v: f64| if v.is_finite() && v > 0.0 { v.round() as u32 } else { 0 };
        NativeGeometry::new(round(self.width), round(self.height))
    }
}

/// Size of the camera's native frame, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeGeometry {
    pub width: u32,
    pub height: u32,
}

impl NativeGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Native size with each unavailable (zero) side replaced by the
    /// rounded preview box side on the same axis.
    pub fn or_rounded(self, preview: PreviewGeometry) -> NativeGeometry {
        let fallback = preview.rounded();
        let pick = |native: u32, rounded: u32| if native == 0 { rounded } else { native };
        NativeGeometry::new(
            pick(self.width, fallback.width),
            pick(self.height, fallback.height),
        )
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

/// Per-axis ratio of native pixels to preview pixels.
///
/// The axes are independent: the preview box and the native frame need not
/// share an aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceRatio {
    pub x: f64,
    pub y: f64,
}

impl SpaceRatio {
    /// Returns `None` if either geometry is degenerate.
    pub fn between(preview: PreviewGeometry, native: NativeGeometry) -> Option<Self> {
        if preview.is_degenerate() || native.is_empty() {
            return None;
        }
        Some(Self {
            x: native.width as f64 / preview.width,
            y: native.height as f64 / preview.height,
        })
    }

    /// Map a preview-space offset into native space.
    pub fn map_offset(&self, dx: f64, dy: f64) -> (f64, f64) {
        (dx * self.x, dy * self.y)
    }
}
