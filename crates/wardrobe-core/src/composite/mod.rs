//! Export compositor: camera frame plus garment, baked into one raster.
//!
//! The pipeline mirrors what the page does with a 2D canvas:
//!
//! 1. Pick the surface size: the native frame size, or the rounded preview
//!    box size when the camera has not reported one
//! 2. Draw the camera frame over the whole surface
//! 3. Map the overlay placement into surface pixels and draw the garment
//!    with the transform's opacity
//!
//! Placement state lives in [`ExportPlacement`] values, never in the
//! surface, so nothing from one draw leaks into the next.

mod blend;
mod draw;

pub use blend::{over, Rgba8};
pub use draw::draw_garment;

use thiserror::Error;

use crate::config::RoomConfig;
use crate::decode::{resize, DecodeError, FilterType, Raster};
use crate::geometry::{NativeGeometry, PreviewGeometry};
use crate::transform::{export_placement, ExportPlacement, TransformState};

/// Errors that can occur while compositing.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// Box or frame size is zero, so no pixel ratio exists.
    #[error("Degenerate geometry: preview {preview_width}x{preview_height}, frame {native_width}x{native_height}")]
    DegenerateGeometry {
        preview_width: f64,
        preview_height: f64,
        native_width: u32,
        native_height: u32,
    },

    /// The camera frame buffer is unusable.
    #[error("Invalid camera frame: {0}")]
    Frame(DecodeError),

    /// The garment raster is unusable.
    #[error("Invalid garment image: {0}")]
    Garment(DecodeError),
}

impl CompositeError {
    fn degenerate(preview: PreviewGeometry, native: NativeGeometry) -> Self {
        CompositeError::DegenerateGeometry {
            preview_width: preview.width,
            preview_height: preview.height,
            native_width: native.width,
            native_height: native.height,
        }
    }
}

/// Drawing parameters taken from the session configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    pub base_width_ratio: f64,
    pub filter: FilterType,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        CompositeOptions::from(&RoomConfig::default())
    }
}

impl From<&RoomConfig> for CompositeOptions {
    fn from(config: &RoomConfig) -> Self {
        Self {
            base_width_ratio: config.base_width_ratio,
            filter: config.export_filter,
        }
    }
}

/// A finished composite.
#[derive(Debug, Clone)]
pub struct Composite {
    pub raster: Raster,
    /// Where the garment was drawn, if one was drawn.
    pub placement: Option<ExportPlacement>,
}

/// Resolve the export surface size.
///
/// Fails if the preview box is degenerate or neither the native frame size
/// nor the rounded box size is usable.
pub fn surface_size(
    preview: PreviewGeometry,
    native: NativeGeometry,
) -> Result<NativeGeometry, CompositeError> {
    let size = native.or_rounded(preview);
    if preview.is_degenerate() || size.is_empty() {
        return Err(CompositeError::degenerate(preview, native));
    }
    Ok(size)
}

/// Draw the camera frame onto a fresh surface of the given size.
///
/// The frame is copied pixel-for-pixel when sizes match and resampled
/// otherwise. An empty frame (no video data yet) yields a transparent
/// surface, like drawing an unready video onto a canvas.
pub fn draw_frame(
    frame: &Raster,
    size: NativeGeometry,
    filter: FilterType,
) -> Result<Raster, CompositeError> {
    if frame.is_empty() {
        return Ok(Raster::transparent(size.width, size.height));
    }
    frame.validate().map_err(CompositeError::Frame)?;
    resize(frame, size.width, size.height, filter).map_err(CompositeError::Frame)
}

/// Draw the garment onto an already-painted surface.
///
/// The surface's own size is the native space; `preview` is the box the
/// user saw the overlay in.
pub fn composite_garment(
    surface: &mut Raster,
    garment: &Raster,
    transform: &TransformState,
    preview: PreviewGeometry,
    options: CompositeOptions,
) -> Result<ExportPlacement, CompositeError> {
    garment.validate().map_err(CompositeError::Garment)?;
    let aspect = garment.aspect_ratio().ok_or(CompositeError::Garment(DecodeError::EmptyImage {
        width: garment.width,
        height: garment.height,
    }))?;

    let native = NativeGeometry::new(surface.width, surface.height);
    let placement = export_placement(transform, preview, native, aspect, options.base_width_ratio)
        .ok_or_else(|| CompositeError::degenerate(preview, native))?;

    let covered = draw_garment(surface, garment, &placement, options.filter);
    log::debug!(
        "garment drawn at ({:.1}, {:.1}) size {:.1}x{:.1}, {} px covered",
        placement.center_x,
        placement.center_y,
        placement.width,
        placement.height,
        covered
    );
    Ok(placement)
}

/// Run the whole pipeline in one go.
pub fn compose(
    frame: &Raster,
    garment: Option<&Raster>,
    transform: &TransformState,
    preview: PreviewGeometry,
    native: NativeGeometry,
    options: CompositeOptions,
) -> Result<Composite, CompositeError> {
    let size = surface_size(preview, native)?;
    let mut raster = draw_frame(frame, size, options.filter)?;

    let placement = match garment {
        Some(garment) => Some(composite_garment(&mut raster, garment, transform, preview, options)?),
        None => None,
    };

    Ok(Composite { raster, placement })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformField;

    const RED: Rgba8 = [255, 0, 0, 255];
    const GREY: Rgba8 = [40, 40, 40, 255];

    /// Mean x/y of pixels equal to `color`.
    fn centroid_of(raster: &Raster, color: Rgba8) -> Option<(f64, f64, usize)> {
        let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
        for y in 0..raster.height {
            for x in 0..raster.width {
                if raster.pixel(x, y) == color {
                    sx += x as f64 + 0.5;
                    sy += y as f64 + 0.5;
                    n += 1;
                }
            }
        }
        (n > 0).then(|| (sx / n as f64, sy / n as f64, n))
    }

    fn opaque_options() -> CompositeOptions {
        CompositeOptions {
            base_width_ratio: 0.65,
            filter: FilterType::Nearest,
        }
    }

    #[test]
    fn test_frame_only_export() {
        let frame = Raster::filled(64, 48, GREY);
        let out = compose(
            &frame,
            None,
            &TransformState::default(),
            PreviewGeometry::new(32.0, 24.0),
            NativeGeometry::new(64, 48),
            CompositeOptions::default(),
        )
        .unwrap();

        assert_eq!(out.raster, frame);
        assert!(out.placement.is_none());
    }

    #[test]
    fn test_garment_center_scales_with_frame_ratio() {
        // 2x frame ratio: offset 6 box px -> 12 frame px
        let frame = Raster::filled(128, 96, GREY);
        let garment = Raster::filled(10, 10, RED);
        let t = TransformState::default()
            .with(TransformField::OffsetX, 6.0)
            .with(TransformField::Opacity, 1.0);

        let out = compose(
            &frame,
            Some(&garment),
            &t,
            PreviewGeometry::new(64.0, 48.0),
            NativeGeometry::new(128, 96),
            opaque_options(),
        )
        .unwrap();

        let placement = out.placement.unwrap();
        assert!((placement.center_x - 76.0).abs() < 1e-9);
        assert!((placement.width - 83.2).abs() < 1e-9);

        let (cx, cy, _) = centroid_of(&out.raster, RED).unwrap();
        assert!((cx - 76.0).abs() <= 0.5, "cx = {}", cx);
        assert!((cy - 48.0).abs() <= 0.5, "cy = {}", cy);
    }

    #[test]
    fn test_garment_width_in_pixels() {
        let frame = Raster::filled(200, 100, GREY);
        let garment = Raster::filled(4, 2, RED);
        let t = TransformState::default()
            .with(TransformField::Scale, 1.2)
            .with(TransformField::Opacity, 1.0);

        let out = compose(
            &frame,
            Some(&garment),
            &t,
            PreviewGeometry::new(100.0, 50.0),
            NativeGeometry::new(200, 100),
            CompositeOptions {
                base_width_ratio: 0.5,
                filter: FilterType::Nearest,
            },
        )
        .unwrap();

        // 200 * 0.5 * 1.2 = 120 wide, 60 tall (garment is 2:1)
        let (_, _, n) = centroid_of(&out.raster, RED).unwrap();
        assert_eq!(n, 120 * 60);
    }

    #[test]
    fn test_surface_falls_back_to_rounded_box() {
        let frame = Raster::filled(10, 10, GREY);
        let out = compose(
            &frame,
            None,
            &TransformState::default(),
            PreviewGeometry::new(30.4, 19.6),
            NativeGeometry::new(0, 0),
            CompositeOptions::default(),
        )
        .unwrap();

        assert_eq!((out.raster.width, out.raster.height), (30, 20));
        assert_eq!(out.raster.pixel(15, 10), GREY);
    }

    #[test]
    fn test_empty_frame_gives_transparent_surface() {
        let out = compose(
            &Raster::transparent(0, 0),
            None,
            &TransformState::default(),
            PreviewGeometry::new(20.0, 10.0),
            NativeGeometry::new(40, 20),
            CompositeOptions::default(),
        )
        .unwrap();

        assert_eq!((out.raster.width, out.raster.height), (40, 20));
        assert!(out.raster.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_box_is_degenerate() {
        let frame = Raster::filled(10, 10, GREY);
        let result = compose(
            &frame,
            None,
            &TransformState::default(),
            PreviewGeometry::new(0.0, 10.0),
            NativeGeometry::new(10, 10),
            CompositeOptions::default(),
        );
        assert!(matches!(result, Err(CompositeError::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_half_known_native_size_keeps_known_axis() {
        let size = surface_size(PreviewGeometry::new(640.0, 480.0), NativeGeometry::new(1280, 0)).unwrap();
        assert_eq!(size, NativeGeometry::new(1280, 480));
    }

    #[test]
    fn test_zero_everything_is_degenerate() {
        assert!(surface_size(PreviewGeometry::new(0.0, 0.0), NativeGeometry::new(0, 0)).is_err());
    }

    #[test]
    fn test_bad_garment_buffer_is_rejected() {
        let mut surface = Raster::filled(10, 10, GREY);
        let garment = Raster {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        let result = composite_garment(
            &mut surface,
            &garment,
            &TransformState::default(),
            PreviewGeometry::new(10.0, 10.0),
            CompositeOptions::default(),
        );
        assert!(matches!(result, Err(CompositeError::Garment(_))));
    }

    #[test]
    fn test_bad_frame_buffer_is_rejected() {
        let frame = Raster {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
        };
        assert!(matches!(
            draw_frame(&frame, NativeGeometry::new(4, 4), FilterType::Bilinear),
            Err(CompositeError::Frame(_))
        ));
    }

    #[test]
    fn test_options_follow_config() {
        let mut config = RoomConfig::default();
        config.export_filter = FilterType::Lanczos3;
        config.base_width_ratio = 0.4;
        let options = CompositeOptions::from(&config);
        assert_eq!(options.filter, FilterType::Lanczos3);
        assert_eq!(options.base_width_ratio, 0.4);
    }
}
