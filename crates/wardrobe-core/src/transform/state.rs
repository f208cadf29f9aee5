//! Transform state shared by the live overlay and the export compositor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when addressing transform fields by name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("Unknown transform field: {0}")]
    UnknownField(String),
}

/// One of the five user-adjustable transform fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformField {
    Scale,
    Rotation,
    OffsetX,
    OffsetY,
    Opacity,
}

impl TransformField {
    /// All fields, in control-panel order.
    pub const ALL: [TransformField; 5] = [
        TransformField::Scale,
        TransformField::Rotation,
        TransformField::OffsetX,
        TransformField::OffsetY,
        TransformField::Opacity,
    ];

    /// Inclusive (min, max) bounds.
    pub fn range(self) -> (f64, f64) {
        match self {
            TransformField::Scale => (0.5, 2.0),
            TransformField::Rotation => (-20.0, 20.0),
            TransformField::OffsetX | TransformField::OffsetY => (-120.0, 120.0),
            TransformField::Opacity => (0.3, 1.0),
        }
    }

    /// Slider increment.
    pub fn step(self) -> f64 {
        match self {
            TransformField::Scale => 0.05,
            TransformField::Rotation => 1.0,
            TransformField::OffsetX | TransformField::OffsetY => 2.0,
            TransformField::Opacity => 0.02,
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            TransformField::Scale => 1.0,
            TransformField::Rotation | TransformField::OffsetX | TransformField::OffsetY => 0.0,
            TransformField::Opacity => 0.95,
        }
    }

    /// Control label shown next to the slider.
    pub fn label(self) -> &'static str {
        match self {
            TransformField::Scale => "Размер",
            TransformField::Rotation => "Поворот",
            TransformField::OffsetX => "Смещение X",
            TransformField::OffsetY => "Смещение Y",
            TransformField::Opacity => "Прозрачность",
        }
    }

    /// Unit suffix for the displayed value.
    pub fn suffix(self) -> &'static str {
        match self {
            TransformField::Scale => "x",
            TransformField::Rotation => "°",
            TransformField::OffsetX | TransformField::OffsetY => "px",
            TransformField::Opacity => "",
        }
    }

    /// The camelCase name used by the page.
    pub fn name(self) -> &'static str {
        match self {
            TransformField::Scale => "scale",
            TransformField::Rotation => "rotation",
            TransformField::OffsetX => "offsetX",
            TransformField::OffsetY => "offsetY",
            TransformField::Opacity => "opacity",
        }
    }

    /// Clamp a value into this field's range.
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Format a value the way the control panel displays it, e.g. `1.50x`.
    pub fn format_value(self, value: f64) -> String {
        format!("{:.2}{}", value, self.suffix())
    }
}

impl fmt::Display for TransformField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformField {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| TransformError::UnknownField(s.to_string()))
    }
}

/// Placement parameters for the garment layer.
///
/// Fields are private so every write goes through [`TransformState::set`],
/// which clamps to the field's range. The live overlay and the export
/// compositor therefore always read the same in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTransform")]
pub struct TransformState {
    scale: f64,
    rotation: f64,
    offset_x: f64,
    offset_y: f64,
    opacity: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: TransformField::Scale.default_value(),
            rotation: TransformField::Rotation.default_value(),
            offset_x: TransformField::OffsetX.default_value(),
            offset_y: TransformField::OffsetY.default_value(),
            opacity: TransformField::Opacity.default_value(),
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in degrees, positive is clockwise on screen.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Horizontal offset in preview box pixels.
    pub fn offset_x(&self) -> f64 {
        self.offset_x
    }

    /// Vertical offset in preview box pixels.
    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn get(&self, field: TransformField) -> f64 {
        match field {
            TransformField::Scale => self.scale,
            TransformField::Rotation => self.rotation,
            TransformField::OffsetX => self.offset_x,
            TransformField::OffsetY => self.offset_y,
            TransformField::Opacity => self.opacity,
        }
    }

    /// Set a field, clamping into its range. Returns the stored value.
    ///
    /// Non-finite input is rejected and the previous value is kept.
    pub fn set(&mut self, field: TransformField, value: f64) -> f64 {
        if !value.is_finite() {
            log::warn!("rejecting non-finite {} value {}", field, value);
            return self.get(field);
        }
        let clamped = field.clamp(value);
        if clamped != value {
            log::debug!("clamped {} from {} to {}", field, value, clamped);
        }
        let slot = match field {
            TransformField::Scale => &mut self.scale,
            TransformField::Rotation => &mut self.rotation,
            TransformField::OffsetX => &mut self.offset_x,
            TransformField::OffsetY => &mut self.offset_y,
            TransformField::Opacity => &mut self.opacity,
        };
        *slot = clamped;
        clamped
    }

    /// Builder-style variant of [`TransformState::set`].
    pub fn with(mut self, field: TransformField, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Restore the fixed defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn rotation_radians(&self) -> f64 {
        self.rotation.to_radians()
    }
}

/// Unchecked wire form; converted through the clamping setter.
#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTransform {
    scale: f64,
    rotation: f64,
    offset_x: f64,
    offset_y: f64,
    opacity: f64,
}

impl Default for RawTransform {
    fn default() -> Self {
        let d = TransformState::default();
        Self {
            scale: d.scale,
            rotation: d.rotation,
            offset_x: d.offset_x,
            offset_y: d.offset_y,
            opacity: d.opacity,
        }
    }
}

impl From<RawTransform> for TransformState {
    fn from(raw: RawTransform) -> Self {
        TransformState::default()
            .with(TransformField::Scale, raw.scale)
            .with(TransformField::Rotation, raw.rotation)
            .with(TransformField::OffsetX, raw.offset_x)
            .with(TransformField::OffsetY, raw.offset_y)
            .with(TransformField::Opacity, raw.opacity)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
