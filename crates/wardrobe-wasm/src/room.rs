//! Fitting-room bindings.
//!
//! [`JsFittingRoom`] is the single object the page talks to. Sliders call
//! `set_field`, the preview reads `overlay_style`, and the export button
//! runs the two phases around its own garment fetch:
//!
//! ```typescript
//! const pending = room.begin_export(frame, video.videoWidth, video.videoHeight, rect.width, rect.height);
//! if (pending) {
//!   const src = pending.garment_src;
//!   let bytes;
//!   try {
//!     bytes = src ? new Uint8Array(await (await fetch(src)).arrayBuffer()) : undefined;
//!   } catch (e) {
//!     pending.cancel();
//!     throw e;
//!   }
//!   const look = room.complete_export(pending, bytes);
//!   download(look.data_url(), look.file_name);
//! }
//! ```
//!
//! A pending export that is neither completed nor cancelled keeps the room
//! busy until it is garbage collected.

use serde::Serialize;
use wardrobe_core::catalog::{GarmentItem, MoodFilter};
use wardrobe_core::decode::{self, Raster};
use wardrobe_core::geometry::{NativeGeometry, PreviewGeometry};
use wardrobe_core::history::ExportedLook;
use wardrobe_core::room::{ExportError, FittingRoom, PendingExport};
use wardrobe_core::transform::{OverlayPlacement, TransformField};
use wardrobe_core::RoomConfig;
use wasm_bindgen::prelude::*;

use crate::camera::constraints_to_js;
use crate::types::{filter_from_u8, JsRaster};

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Slider metadata plus the current value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldView {
    name: &'static str,
    label: &'static str,
    min: f64,
    max: f64,
    step: f64,
    suffix: &'static str,
    value: f64,
    display: String,
}

impl FieldView {
    fn new(field: TransformField, value: f64) -> Self {
        let (min, max) = field.range();
        Self {
            name: field.name(),
            label: field.label(),
            min,
            max,
            step: field.step(),
            suffix: field.suffix(),
            value,
            display: field.format_value(value),
        }
    }
}

/// What the page applies to the overlay `<img>`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlayStyle {
    transform: String,
    width: String,
    opacity: f64,
    center_x: f64,
    center_y: f64,
    rendered_width: f64,
    rendered_height: f64,
}

impl OverlayStyle {
    fn new(placement: &OverlayPlacement, preview: PreviewGeometry) -> Self {
        let (center_x, center_y) = placement.center_in(preview);
        Self {
            transform: placement.css_transform(),
            width: placement.css_width(),
            opacity: placement.opacity,
            center_x,
            center_y,
            rendered_width: placement.width(),
            rendered_height: placement.height(),
        }
    }
}

/// A mood chip in the catalog header.
#[derive(Debug, Clone, Serialize)]
struct MoodChip {
    value: &'static str,
    label: &'static str,
    active: bool,
}

/// History entry as the page renders it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookView<'a> {
    id: f64,
    mood: &'a str,
    title: &'a str,
    file_name: &'a str,
    url: String,
}

impl<'a> From<&'a ExportedLook> for LookView<'a> {
    fn from(look: &'a ExportedLook) -> Self {
        Self {
            id: look.id as f64,
            mood: look.mood.as_str(),
            title: &look.title,
            file_name: &look.file_name,
            url: look.data_url(),
        }
    }
}

/// The fitting-room session for JavaScript.
#[wasm_bindgen]
pub struct JsFittingRoom {
    inner: FittingRoom,
}

#[wasm_bindgen]
impl JsFittingRoom {
    /// Create a session. `config` is an optional object with any of
    /// `baseWidthRatio`, `historyCapacity`, `idealCameraWidth`, `exportFilter`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsFittingRoom, JsValue> {
        let config: RoomConfig = if config.is_undefined() || config.is_null() {
            RoomConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_error)?
        };
        Ok(Self {
            inner: FittingRoom::new(config),
        })
    }

    // =========================================================================
    // Transform
    // =========================================================================

    /// Current transform as `{ scale, rotation, offsetX, offsetY, opacity }`.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.transform())
    }

    /// Value of one field by its camelCase name.
    pub fn field(&self, name: &str) -> Result<f64, JsValue> {
        let field: TransformField = name.parse().map_err(js_error)?;
        Ok(self.inner.transform().get(field))
    }

    /// Set a field by name; returns the clamped value actually stored.
    pub fn set_field(&mut self, name: &str, value: f64) -> Result<f64, JsValue> {
        let field: TransformField = name.parse().map_err(js_error)?;
        Ok(self.inner.set_transform(field, value))
    }

    pub fn reset_transform(&mut self) {
        self.inner.reset_transform();
    }

    /// Slider descriptors for every field, in display order.
    pub fn fields(&self) -> Result<JsValue, JsValue> {
        let transform = self.inner.transform();
        let views: Vec<FieldView> = TransformField::ALL
            .iter()
            .map(|&field| FieldView::new(field, transform.get(field)))
            .collect();
        to_js(&views)
    }

    /// CSS for the live overlay in a box of the given size.
    ///
    /// `image_aspect` is the garment's natural height / width.
    pub fn overlay_style(
        &self,
        box_width: f64,
        box_height: f64,
        image_aspect: f64,
    ) -> Result<JsValue, JsValue> {
        let placement = self.inner.overlay_placement(box_width, image_aspect);
        to_js(&OverlayStyle::new(&placement, PreviewGeometry::new(box_width, box_height)))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Every garment in the catalog.
    pub fn catalog(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.catalog().items())
    }

    /// Garments visible under the active mood filter.
    pub fn visible_items(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.visible_items())
    }

    /// The filter chips: `all` plus one per mood.
    pub fn mood_chips(&self) -> Result<JsValue, JsValue> {
        let active = self.inner.mood_filter();
        let chips: Vec<MoodChip> = MoodFilter::chips()
            .iter()
            .map(|&chip| MoodChip {
                value: chip.as_str(),
                label: chip.label(),
                active: chip == active,
            })
            .collect();
        to_js(&chips)
    }

    #[wasm_bindgen(getter)]
    pub fn mood_filter(&self) -> String {
        self.inner.mood_filter().as_str().to_string()
    }

    /// Switch the mood filter; returns the selected garment (or `undefined`).
    pub fn set_mood_filter(&mut self, name: &str) -> Result<JsValue, JsValue> {
        let filter: MoodFilter = name.parse().map_err(js_error)?;
        let selected = self.inner.set_mood_filter(filter);
        to_js(&selected)
    }

    /// Select a garment by id; returns it.
    pub fn select(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let item = self.inner.select(id).map_err(js_error)?;
        to_js(item)
    }

    pub fn clear_selection(&mut self) {
        self.inner.clear_selection();
    }

    /// The selected garment, or `undefined`.
    pub fn selected(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.selected())
    }

    /// Hint for the empty preview, or `undefined` while a garment is selected.
    #[wasm_bindgen(getter)]
    pub fn placeholder(&self) -> Option<String> {
        self.inner.placeholder().map(str::to_string)
    }

    // =========================================================================
    // Camera & export
    // =========================================================================

    /// `getUserMedia` constraints for this session's configuration.
    pub fn camera_constraints(&self) -> Result<JsValue, JsValue> {
        constraints_to_js(&self.inner.camera_constraints())
    }

    /// Set the export resampling filter (0 = nearest, 1 = bilinear, 2 = lanczos3).
    pub fn set_export_filter(&mut self, filter: u8) {
        self.inner.set_export_filter(filter_from_u8(filter));
    }

    #[wasm_bindgen(getter)]
    pub fn is_exporting(&self) -> bool {
        self.inner.is_exporting()
    }

    /// Export button label.
    #[wasm_bindgen(getter)]
    pub fn export_label(&self) -> String {
        self.inner.export_label().to_string()
    }

    /// First export phase.
    ///
    /// Returns `undefined` when there is nothing to export: no frame or box,
    /// a zero-sized box or frame, or another export still running. Pass zero
    /// native dimensions when the video has not reported its size.
    pub fn begin_export(
        &self,
        frame: Option<JsRaster>,
        native_width: u32,
        native_height: u32,
        box_width: Option<f64>,
        box_height: Option<f64>,
    ) -> Result<Option<JsPendingExport>, JsValue> {
        let preview = box_width
            .zip(box_height)
            .map(|(width, height)| PreviewGeometry::new(width, height));
        let frame = frame.as_ref().map(JsRaster::as_raster);
        let native = NativeGeometry::new(native_width, native_height);

        match self.inner.begin_export(frame, native, preview) {
            Ok(inner) => Ok(Some(JsPendingExport { inner })),
            Err(err) if err.is_precondition() => {
                log::debug!("export skipped: {}", err);
                Ok(None)
            }
            Err(err) => Err(js_error(err)),
        }
    }

    /// Second export phase with the garment's encoded file bytes.
    ///
    /// Omit `garment_bytes` for a frame-only export.
    pub fn complete_export(
        &mut self,
        pending: JsPendingExport,
        garment_bytes: Option<Vec<u8>>,
    ) -> Result<JsExportedLook, JsValue> {
        let garment = match garment_bytes {
            Some(bytes) => Some(decode::decode_image(&bytes).map_err(|e| js_error(ExportError::from(e)))?),
            None => None,
        };
        self.finish(pending, garment.as_ref())
    }

    /// Second export phase with an already decoded garment raster.
    pub fn complete_export_with_raster(
        &mut self,
        pending: JsPendingExport,
        garment: Option<JsRaster>,
    ) -> Result<JsExportedLook, JsValue> {
        let garment = garment.as_ref().map(JsRaster::as_raster);
        self.finish(pending, garment)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Saved looks, most recent first, as `{ id, mood, title, fileName, url }`.
    pub fn history(&self) -> Result<JsValue, JsValue> {
        let views: Vec<LookView<'_>> = self.inner.history().iter().map(LookView::from).collect();
        to_js(&views)
    }

    #[wasm_bindgen(getter)]
    pub fn history_len(&self) -> usize {
        self.inner.history().len()
    }

    /// Counter next to the history strip, e.g. `2 / 4`.
    #[wasm_bindgen(getter)]
    pub fn history_badge(&self) -> String {
        self.inner.history_badge()
    }
}

impl JsFittingRoom {
    fn finish(
        &mut self,
        pending: JsPendingExport,
        garment: Option<&Raster>,
    ) -> Result<JsExportedLook, JsValue> {
        self.inner
            .complete_export(pending.inner, garment)
            .map(JsExportedLook::from_look)
            .map_err(js_error)
    }
}

/// An export waiting for its garment image.
///
/// Freeing it without completing cancels the export.
#[wasm_bindgen]
pub struct JsPendingExport {
    inner: PendingExport,
}

#[wasm_bindgen]
impl JsPendingExport {
    /// URL of the garment image to load, or `undefined` for a frame-only export.
    #[wasm_bindgen(getter)]
    pub fn garment_src(&self) -> Option<String> {
        self.inner.garment().map(|item: &GarmentItem| item.image_src.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn garment_id(&self) -> Option<String> {
        self.inner.garment().map(|item| item.id.clone())
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.size().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.size().height
    }

    /// Abandon the export and let the next one start.
    pub fn cancel(self) {
        self.inner.cancel();
    }
}

/// A finished export.
#[wasm_bindgen]
pub struct JsExportedLook {
    inner: ExportedLook,
}

#[wasm_bindgen]
impl JsExportedLook {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.inner.id as f64
    }

    /// The garment's mood, or `all`.
    #[wasm_bindgen(getter)]
    pub fn mood(&self) -> String {
        self.inner.mood.as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.inner.title.clone()
    }

    /// `mood-wardrobe-<mood>.png`
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// `data:image/png;base64,...` for the download link.
    pub fn data_url(&self) -> String {
        self.inner.data_url()
    }

    /// Encoded PNG bytes as Uint8Array (a copy).
    pub fn png(&self) -> Vec<u8> {
        self.inner.png.clone()
    }
}

impl JsExportedLook {
    fn from_look(look: &ExportedLook) -> Self {
        Self {
            inner: look.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardrobe_core::encode::encode_png;

    fn room() -> JsFittingRoom {
        JsFittingRoom {
            inner: FittingRoom::default(),
        }
    }

    fn frame() -> JsRaster {
        JsRaster::from_raster(Raster::filled(16, 12, [30, 30, 30, 255]))
    }

    #[test]
    fn test_set_field_clamps_by_name() {
        let mut room = room();
        assert_eq!(room.set_field("scale", 9.0).unwrap(), 2.0);
        assert_eq!(room.set_field("offsetY", -300.0).unwrap(), -120.0);
        assert_eq!(room.field("scale").unwrap(), 2.0);

        room.reset_transform();
        assert_eq!(room.field("opacity").unwrap(), 0.95);
    }

    #[test]
    fn test_field_views_follow_slider_order() {
        let room = room();
        let views: Vec<FieldView> = TransformField::ALL
            .iter()
            .map(|&f| FieldView::new(f, room.inner.transform().get(f)))
            .collect();
        let names: Vec<&str> = views.iter().map(|v| v.name).collect();
        assert_eq!(names, ["scale", "rotation", "offsetX", "offsetY", "opacity"]);
        assert_eq!(views[0].display, "1.00x");
    }

    #[test]
    fn test_overlay_style_matches_placement() {
        let mut room = room();
        room.set_field("offsetX", 10.0).unwrap();
        let placement = room.inner.overlay_placement(400.0, 1.0);
        let style = OverlayStyle::new(&placement, PreviewGeometry::new(400.0, 300.0));

        assert_eq!(style.width, "65%");
        assert_eq!((style.center_x, style.center_y), (210.0, 150.0));
        assert_eq!(style.transform, placement.css_transform());
    }

    #[test]
    fn test_two_phase_export_with_bytes() {
        let mut room = room();
        let pending = room
            .begin_export(Some(frame()), 16, 12, Some(16.0), Some(12.0))
            .unwrap()
            .unwrap();
        assert!(room.is_exporting());
        assert!(pending.garment_src().is_some());
        assert_eq!(pending.file_name(), "mood-wardrobe-chill.png");

        let garment = encode_png(&Raster::filled(4, 6, [200, 10, 10, 255])).unwrap();
        let look = room.complete_export(pending, Some(garment)).unwrap();

        assert!(!room.is_exporting());
        assert_eq!((look.width(), look.height()), (16, 12));
        assert_eq!(look.mood(), "chill");
        assert_eq!(room.history_len(), 1);
        assert_eq!(room.history_badge(), "1 / 4");
    }

    #[test]
    fn test_preconditions_return_none() {
        let room = room();
        assert!(room.begin_export(None, 16, 12, Some(16.0), Some(12.0)).unwrap().is_none());
        assert!(room.begin_export(Some(frame()), 16, 12, None, Some(12.0)).unwrap().is_none());
        assert!(room.begin_export(Some(frame()), 0, 0, Some(0.0), Some(0.0)).unwrap().is_none());
        assert!(!room.is_exporting());
    }

    #[test]
    fn test_second_begin_while_pending_returns_none() {
        let mut room = room();
        room.clear_selection();
        let first = room.begin_export(Some(frame()), 16, 12, Some(16.0), Some(12.0)).unwrap();
        let second = room.begin_export(Some(frame()), 16, 12, Some(16.0), Some(12.0)).unwrap();
        assert!(first.is_some());
        assert!(second.is_none());

        let look = room.complete_export_with_raster(first.unwrap(), None).unwrap();
        assert_eq!(look.title(), "Mood look");
        assert_eq!(look.file_name(), "mood-wardrobe-all.png");
    }

    #[test]
    fn test_cancel_releases_busy_flag() {
        let room = room();
        let pending = room.begin_export(Some(frame()), 16, 12, Some(16.0), Some(12.0)).unwrap();
        pending.unwrap().cancel();
        assert!(!room.is_exporting());

        let next = room.begin_export(Some(frame()), 16, 12, Some(16.0), Some(12.0)).unwrap();
        assert!(next.is_some());
        assert!(room.is_exporting());
    }

    #[test]
    fn test_look_view_fields() {
        let look = ExportedLook {
            id: 3,
            mood: MoodFilter::All,
            title: "Mood look".to_string(),
            file_name: "mood-wardrobe-all.png".to_string(),
            width: 1,
            height: 1,
            png: vec![1, 2, 3],
        };
        let view = LookView::from(&look);
        assert_eq!(view.id, 3.0);
        assert_eq!(view.mood, "all");
        assert_eq!(view.url, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_export_filter_setter() {
        let mut room = room();
        room.set_export_filter(2);
        assert_eq!(room.inner.config().export_filter, wardrobe_core::FilterType::Lanczos3);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct TestConfig {
        history_capacity: usize,
    }

    #[wasm_bindgen_test]
    fn test_constructor_accepts_undefined_config() {
        let room = JsFittingRoom::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(room.history_badge(), "0 / 4");
    }

    #[wasm_bindgen_test]
    fn test_constructor_reads_partial_config() {
        let config = serde_wasm_bindgen::to_value(&TestConfig { history_capacity: 2 }).unwrap();
        let room = JsFittingRoom::new(config).unwrap();
        assert_eq!(room.history_badge(), "0 / 2");
    }

    #[wasm_bindgen_test]
    fn test_unknown_field_is_an_error() {
        let mut room = JsFittingRoom::new(JsValue::UNDEFINED).unwrap();
        assert!(room.set_field("skew", 1.0).is_err());
    }

    #[wasm_bindgen_test]
    fn test_mood_switch_returns_selection() {
        let mut room = JsFittingRoom::new(JsValue::UNDEFINED).unwrap();
        let selected = room.set_mood_filter("bold").unwrap();
        let mood = js_sys::Reflect::get(&selected, &"mood".into()).unwrap();
        assert_eq!(mood.as_string().as_deref(), Some("bold"));
        assert!(room.set_mood_filter("sleepy").is_err());
    }

    #[wasm_bindgen_test]
    fn test_bad_garment_bytes_fail_and_release() {
        let mut room = JsFittingRoom::new(JsValue::UNDEFINED).unwrap();
        let frame = JsRaster::from_raster(Raster::filled(8, 8, [0, 0, 0, 255]));
        let pending = room
            .begin_export(Some(frame), 8, 8, Some(8.0), Some(8.0))
            .unwrap()
            .unwrap();
        assert!(room.complete_export(pending, Some(vec![0, 1, 2])).is_err());
        assert!(!room.is_exporting());
        assert_eq!(room.history_len(), 0);
    }

    #[wasm_bindgen_test]
    fn test_begin_after_cancel_succeeds() {
        let room = JsFittingRoom::new(JsValue::UNDEFINED).unwrap();
        let frame = || JsRaster::from_raster(Raster::filled(8, 8, [0, 0, 0, 255]));
        let pending = room
            .begin_export(Some(frame()), 8, 8, Some(8.0), Some(8.0))
            .unwrap()
            .unwrap();
        assert!(room.begin_export(Some(frame()), 8, 8, Some(8.0), Some(8.0)).unwrap().is_none());

        pending.cancel();

        let next = room.begin_export(Some(frame()), 8, 8, Some(8.0), Some(8.0)).unwrap();
        assert!(next.is_some());
    }
}
