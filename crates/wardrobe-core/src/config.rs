//! Runtime configuration for a fitting room session.

use serde::{Deserialize, Serialize};

use crate::decode::FilterType;

/// Untransformed garment width as a fraction of the preview/frame width.
pub const BASE_WIDTH_RATIO: f64 = 0.65;

/// Number of exported looks kept in the history strip.
pub const HISTORY_CAPACITY: usize = 4;

/// Ideal camera capture width requested from the device.
pub const IDEAL_CAMERA_WIDTH: u32 = 1280;

/// Session configuration.
///
/// Every field has a default, so a partial JS object such as
/// `{ historyCapacity: 6 }` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomConfig {
    /// Garment base width relative to the surface width.
    pub base_width_ratio: f64,
    /// Maximum number of exported looks kept in memory.
    pub history_capacity: usize,
    /// Ideal capture width requested from the camera.
    pub ideal_camera_width: u32,
    /// Resampling used when drawing the garment and stretching the frame.
    pub export_filter: FilterType,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            base_width_ratio: BASE_WIDTH_RATIO,
            history_capacity: HISTORY_CAPACITY,
            ideal_camera_width: IDEAL_CAMERA_WIDTH,
            export_filter: FilterType::Bilinear,
        }
    }
}

impl RoomConfig {
    /// Replace out-of-range values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.base_width_ratio.is_finite() && self.base_width_ratio > 0.0) {
            log::warn!(
                "ignoring base width ratio {}, using {}",
                self.base_width_ratio,
                defaults.base_width_ratio
            );
            self.base_width_ratio = defaults.base_width_ratio;
        }
        if self.history_capacity == 0 {
            log::warn!("history capacity must be positive, using {}", defaults.history_capacity);
            self.history_capacity = defaults.history_capacity;
        }
        if self.ideal_camera_width == 0 {
            self.ideal_camera_width = defaults.ideal_camera_width;
        }
        self
    }
}
