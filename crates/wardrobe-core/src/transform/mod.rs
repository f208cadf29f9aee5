//! Garment transform: the user-adjustable state and where it puts the garment.
//!
//! # Coordinate System
//!
//! - Offsets are in preview box pixels (CSS pixels)
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - Origin is top-left corner, y axis pointing down

mod placement;
mod state;

pub use placement::{
    compute_affine, compute_affine_with, export_placement, ExportPlacement, OverlayPlacement,
};
pub use state::{TransformError, TransformField, TransformState};
