//! Garment placement in preview box space and native frame space.
//!
//! [`compute_affine`] is the single source of truth for where the garment
//! sits. The live overlay renders its result as CSS; the export compositor
//! maps the very same placement into native pixels with
//! [`ExportPlacement::from_overlay`]. Neither side re-derives the transform
//! on its own, so the two cannot drift apart.
//!
//! # Transform Order
//!
//! 1. Center the garment in the box
//! 2. Translate by `(offsetX, offsetY)` box pixels
//! 3. Scale by `scale`
//! 4. Rotate by `rotation` degrees about the garment's own center
//!
//! Rotation is clockwise on screen (y axis pointing down), matching both
//! CSS `rotate()` and the canvas `rotate()` call.

use serde::Serialize;

use super::TransformState;
use crate::config::BASE_WIDTH_RATIO;
use crate::geometry::{NativeGeometry, PreviewGeometry, SpaceRatio};

/// Garment placement in preview box space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayPlacement {
    /// Horizontal translation from the box center, in box pixels.
    pub x: f64,
    /// Vertical translation from the box center, in box pixels.
    pub y: f64,
    /// Untransformed garment width, in box pixels.
    pub base_width: f64,
    /// Untransformed garment height, in box pixels.
    pub base_height: f64,
    /// Garment width as a fraction of the box width, before scaling.
    pub base_width_ratio: f64,
    /// Natural height / width of the garment image.
    pub aspect: f64,
    pub scale: f64,
    pub rotation_rad: f64,
    pub opacity: f64,
}

/// Compute the overlay placement with the standard base width ratio.
///
/// `image_aspect` is the garment's natural height divided by its width.
pub fn compute_affine(
    transform: &TransformState,
    box_width: f64,
    image_aspect: f64,
) -> OverlayPlacement {
    compute_affine_with(transform, box_width, image_aspect, BASE_WIDTH_RATIO)
}

/// Compute the overlay placement with an explicit base width ratio.
pub fn compute_affine_with(
    transform: &TransformState,
    box_width: f64,
    image_aspect: f64,
    base_width_ratio: f64,
) -> OverlayPlacement {
    let base_width = box_width * base_width_ratio;
    OverlayPlacement {
        x: transform.offset_x(),
        y: transform.offset_y(),
        base_width,
        base_height: base_width * image_aspect,
        base_width_ratio,
        aspect: image_aspect,
        scale: transform.scale(),
        rotation_rad: transform.rotation_radians(),
        opacity: transform.opacity(),
    }
}

impl OverlayPlacement {
    /// On-screen garment width after scaling.
    pub fn width(&self) -> f64 {
        self.base_width * self.scale
    }

    /// On-screen garment height after scaling.
    pub fn height(&self) -> f64 {
        self.base_height * self.scale
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_rad.to_degrees()
    }

    /// Absolute garment center inside the given preview box.
    pub fn center_in(&self, preview: PreviewGeometry) -> (f64, f64) {
        (preview.width / 2.0 + self.x, preview.height / 2.0 + self.y)
    }

    /// CSS `transform` value for an element positioned at the box center
    /// (`left: 50%; top: 50%`) with `transform-origin: center`.
    pub fn css_transform(&self) -> String {
        format!(
            "translate(-50%, -50%) translate({}px, {}px) scale({}) rotate({}deg)",
            self.x,
            self.y,
            self.scale,
            self.rotation_degrees()
        )
    }

    /// CSS `width` value, relative to the box.
    pub fn css_width(&self) -> String {
        format!("{}%", self.base_width_ratio * 100.0)
    }
}

/// Garment placement in native frame space, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlacement {
    /// Garment center on the surface, in native pixels.
    pub center_x: f64,
    pub center_y: f64,
    /// Drawn garment size, in native pixels.
    pub width: f64,
    pub height: f64,
    pub rotation_rad: f64,
    pub opacity: f64,
}

impl ExportPlacement {
    /// Map an overlay placement onto a native surface.
    ///
    /// Offsets are scaled by the per-axis box-to-frame ratio. The width is
    /// the surface width times the base ratio and scale; the height follows
    /// the garment's own aspect ratio, not the box's.
    ///
    /// Returns `None` if either geometry is degenerate.
    pub fn from_overlay(
        overlay: &OverlayPlacement,
        preview: PreviewGeometry,
        native: NativeGeometry,
    ) -> Option<Self> {
        let ratio = SpaceRatio::between(preview, native)?;
        let (cx, cy) = native.center();
        let (dx, dy) = ratio.map_offset(overlay.x, overlay.y);
        let width = native.width as f64 * overlay.base_width_ratio * overlay.scale;
        Some(Self {
            center_x: cx + dx,
            center_y: cy + dy,
            width,
            height: width * overlay.aspect,
            rotation_rad: overlay.rotation_rad,
            opacity: overlay.opacity,
        })
    }

    /// Corners of the rotated garment rectangle, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (sin, cos) = self.rotation_rad.sin_cos();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(lx, ly)| {
            (
                self.center_x + lx * cos - ly * sin,
                self.center_y + lx * sin + ly * cos,
            )
        })
    }

    /// Map a surface point into the garment's local frame, with the origin
    /// at the garment center and axes aligned with the unrotated garment.
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation_rad.sin_cos();
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        (dx * cos + dy * sin, -dx * sin + dy * cos)
    }
}

/// Convenience: overlay placement mapped straight into native space.
pub fn export_placement(
    transform: &TransformState,
    preview: PreviewGeometry,
    native: NativeGeometry,
    image_aspect: f64,
    base_width_ratio: f64,
) -> Option<ExportPlacement> {
    let overlay = compute_affine_with(transform, preview.width, image_aspect, base_width_ratio);
    ExportPlacement::from_overlay(&overlay, preview, native)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
