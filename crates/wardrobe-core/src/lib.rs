//! Mood Wardrobe Core - virtual try-on compositing
//!
//! This crate provides the engine behind the fitting room: the garment
//! transform shared by the live overlay and the export, the compositor that
//! bakes camera frame plus garment into a PNG, and the session state around
//! them (catalog, mood filter, camera lifecycle, look history).
//!
//! Two coordinate spaces are involved and kept apart by type:
//! [`PreviewGeometry`] for the on-screen box in CSS pixels and
//! [`NativeGeometry`] for the camera frame in device pixels.

pub mod camera;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod history;
pub mod room;
pub mod transform;

pub use camera::{
    CameraConstraints, CameraDevice, CameraError, CameraRelease, CameraSession, CameraStatus,
};
pub use catalog::{Catalog, CatalogError, GarmentItem, Mood, MoodFilter};
pub use composite::{compose, Composite, CompositeError, CompositeOptions};
pub use config::{RoomConfig, BASE_WIDTH_RATIO, HISTORY_CAPACITY};
pub use decode::{decode_image, DecodeError, FilterType, Raster};
pub use encode::{encode_png, to_data_url, EncodeError};
pub use geometry::{NativeGeometry, PreviewGeometry, SpaceRatio};
pub use history::{export_file_name, ExportedLook, LookHistory};
pub use room::{ExportError, FittingRoom, GarmentLoader, PendingExport};
pub use transform::{
    compute_affine, export_placement, ExportPlacement, OverlayPlacement, TransformError,
    TransformField, TransformState,
};

/// Crate version, reported by the bindings.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_and_export_agree_on_placement() {
        let transform = TransformState::default()
            .with(TransformField::OffsetX, 60.0)
            .with(TransformField::Scale, 1.5);
        let preview = PreviewGeometry::new(640.0, 480.0);
        let native = NativeGeometry::new(1280, 960);

        let overlay = compute_affine(&transform, preview.width, 1.2);
        let export = export_placement(&transform, preview, native, 1.2, BASE_WIDTH_RATIO).unwrap();

        assert!((export.center_x - 760.0).abs() < 1e-9);
        assert!((export.width - 1248.0).abs() < 1e-9);
        // same fraction of the box width in both spaces
        let ratio = native.width as f64 / preview.width;
        assert!((overlay.width() * ratio - export.width).abs() < 1e-9);
        assert!((overlay.height() * ratio - export.height).abs() < 1e-9);
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
