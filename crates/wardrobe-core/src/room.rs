//! The fitting-room session.
//!
//! [`FittingRoom`] owns everything the page mutates: the transform sliders,
//! the mood filter and selected garment, and the history of exported looks.
//! Both the live overlay and the export read the same [`TransformState`],
//! so the preview and the downloaded PNG cannot drift apart.
//!
//! Export is split in two because the garment image is fetched by the page:
//!
//! ```text
//! begin_export()  -> checks, snapshot, camera frame drawn   (PendingExport)
//!   ... page loads the garment image ...
//! complete_export() -> garment drawn, PNG encoded, history updated
//! ```
//!
//! The [`PendingExport`] holds the busy flag; dropping it on any path,
//! including errors, lets the next export through.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::camera::CameraConstraints;
use crate::catalog::{Catalog, CatalogError, GarmentItem, MoodFilter};
use crate::composite::{composite_garment, draw_frame, surface_size, CompositeError, CompositeOptions};
use crate::config::RoomConfig;
use crate::decode::{DecodeError, FilterType, Raster};
use crate::encode::{encode_png, EncodeError};
use crate::geometry::{NativeGeometry, PreviewGeometry};
use crate::history::{export_file_name, ExportedLook, LookHistory, FALLBACK_TITLE};
use crate::transform::{compute_affine_with, OverlayPlacement, TransformField, TransformState};

/// Hint shown in the preview when no garment is selected.
pub const PLACEHOLDER_HINT: &str =
    "Выберите одежду из каталога, чтобы примерить её поверх камеры.";

/// Export failures.
///
/// Precondition failures ([`ExportError::is_precondition`]) leave the
/// session untouched and may be ignored by the caller.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is still in flight.
    #[error("An export is already in progress")]
    Busy,

    /// The preview box has not been laid out.
    #[error("Preview box is not available")]
    MissingPreview,

    /// The camera element is not available.
    #[error("Camera frame is not available")]
    MissingFrame,

    /// Box or frame size is zero.
    #[error("Cannot export a {width}x{height} surface from a {preview_width}x{preview_height} preview")]
    ZeroDimensions {
        width: u32,
        height: u32,
        preview_width: f64,
        preview_height: f64,
    },

    /// A garment is selected but its image was not supplied.
    #[error("Garment image was not loaded")]
    MissingGarmentImage,

    /// The garment image could not be loaded or decoded.
    #[error("Failed to load garment image: {0}")]
    GarmentLoad(DecodeError),

    /// The camera frame could not be drawn.
    #[error("Failed to draw camera frame: {0}")]
    Frame(DecodeError),

    /// The pending export was started by another session.
    #[error("Export belongs to a different fitting room")]
    ForeignExport,

    /// PNG encoding of the surface failed.
    #[error("Failed to encode export: {0}")]
    Encode(#[from] EncodeError),
}

impl ExportError {
    /// Whether this is a recoverable "nothing to export" condition.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExportError::Busy
                | ExportError::MissingPreview
                | ExportError::MissingFrame
                | ExportError::ZeroDimensions { .. }
        )
    }
}

impl From<DecodeError> for ExportError {
    fn from(err: DecodeError) -> Self {
        ExportError::GarmentLoad(err)
    }
}

impl From<CompositeError> for ExportError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::DegenerateGeometry {
                preview_width,
                preview_height,
                native_width,
                native_height,
            } => ExportError::ZeroDimensions {
                width: native_width,
                height: native_height,
                preview_width,
                preview_height,
            },
            CompositeError::Frame(err) => ExportError::Frame(err),
            CompositeError::Garment(err) => ExportError::GarmentLoad(err),
        }
    }
}

/// Holds the export busy flag until dropped.
#[derive(Debug)]
struct BusyGuard {
    flag: Rc<Cell<bool>>,
}

impl BusyGuard {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.replace(true) {
            return None;
        }
        Some(Self {
            flag: Rc::clone(flag),
        })
    }

    fn guards(&self, flag: &Rc<Cell<bool>>) -> bool {
        Rc::ptr_eq(&self.flag, flag)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// An export between its two phases.
///
/// The camera frame is already drawn and the transform snapshotted, so
/// slider changes made while the garment loads do not affect this export.
#[derive(Debug)]
pub struct PendingExport {
    surface: Raster,
    preview: PreviewGeometry,
    transform: TransformState,
    garment: Option<GarmentItem>,
    _busy: BusyGuard,
}

impl PendingExport {
    /// The garment that must be loaded before completing, if any.
    pub fn garment(&self) -> Option<&GarmentItem> {
        self.garment.as_ref()
    }

    /// Size of the export surface.
    pub fn size(&self) -> NativeGeometry {
        NativeGeometry::new(self.surface.width, self.surface.height)
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Mood recorded with the look: the garment's, or `all`.
    pub fn mood(&self) -> MoodFilter {
        self.garment
            .as_ref()
            .map_or(MoodFilter::All, |item| MoodFilter::Only(item.mood))
    }

    pub fn title(&self) -> &str {
        self.garment
            .as_ref()
            .map_or(FALLBACK_TITLE, |item| item.title.as_str())
    }

    pub fn file_name(&self) -> String {
        export_file_name(self.mood())
    }

    /// Abandon the export, for example after the garment fetch failed.
    /// The session's busy flag is released.
    pub fn cancel(self) {
        log::debug!("export cancelled");
    }
}

/// Source of decoded garment images for the synchronous export path.
pub trait GarmentLoader {
    fn load(&mut self, item: &GarmentItem) -> Result<Raster, DecodeError>;
}

impl<F> GarmentLoader for F
where
    F: FnMut(&GarmentItem) -> Result<Raster, DecodeError>,
{
    fn load(&mut self, item: &GarmentItem) -> Result<Raster, DecodeError> {
        self(item)
    }
}

/// One user's try-on session.
#[derive(Debug)]
pub struct FittingRoom {
    config: RoomConfig,
    catalog: Catalog,
    filter: MoodFilter,
    selected: Option<usize>,
    transform: TransformState,
    history: LookHistory,
    busy: Rc<Cell<bool>>,
    next_id: u64,
}

impl Default for FittingRoom {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

impl FittingRoom {
    /// Create a session over the built-in catalog.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_catalog(config, Catalog::builtin())
    }

    /// Create a session over a custom catalog. The first item starts selected.
    pub fn with_catalog(config: RoomConfig, catalog: Catalog) -> Self {
        let config = config.sanitized();
        let selected = (!catalog.is_empty()).then_some(0);
        Self {
            history: LookHistory::new(config.history_capacity),
            config,
            catalog,
            filter: MoodFilter::All,
            selected,
            transform: TransformState::default(),
            busy: Rc::new(Cell::new(false)),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Change the resampling used by later exports.
    pub fn set_export_filter(&mut self, filter: FilterType) {
        self.config.export_filter = filter;
    }

    /// Constraints to request the camera with.
    pub fn camera_constraints(&self) -> CameraConstraints {
        CameraConstraints {
            ideal_width: self.config.ideal_camera_width,
            ..CameraConstraints::default()
        }
    }

    // Transform

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    /// Set a transform field, returning the value actually stored.
    pub fn set_transform(&mut self, field: TransformField, value: f64) -> f64 {
        self.transform.set(field, value)
    }

    pub fn reset_transform(&mut self) {
        self.transform.reset();
    }

    /// Placement of the live overlay in a preview box of the given width.
    pub fn overlay_placement(&self, box_width: f64, image_aspect: f64) -> OverlayPlacement {
        compute_affine_with(
            &self.transform,
            box_width,
            image_aspect,
            self.config.base_width_ratio,
        )
    }

    // Catalog

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mood_filter(&self) -> MoodFilter {
        self.filter
    }

    /// Items visible under the active filter.
    pub fn visible_items(&self) -> Vec<&GarmentItem> {
        self.catalog.filter(self.filter)
    }

    pub fn selected(&self) -> Option<&GarmentItem> {
        self.selected.and_then(|idx| self.catalog.items().get(idx))
    }

    /// Hint text for the preview, shown only when nothing is selected.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.selected().is_none().then_some(PLACEHOLDER_HINT)
    }

    /// Switch the mood filter.
    ///
    /// A specific mood selects its first item when the current selection
    /// does not match it or nothing is selected. `all` keeps the selection.
    pub fn set_mood_filter(&mut self, filter: MoodFilter) -> Option<&GarmentItem> {
        self.filter = filter;
        if let MoodFilter::Only(mood) = filter {
            let matches = self.selected().is_some_and(|item| item.mood == mood);
            if !matches {
                if let Some(idx) = self.catalog.items().iter().position(|item| item.mood == mood) {
                    log::debug!("mood {} selects {}", mood, self.catalog.items()[idx].id);
                    self.selected = Some(idx);
                }
            }
        }
        self.selected()
    }

    /// Select a garment by id.
    pub fn select(&mut self, id: &str) -> Result<&GarmentItem, CatalogError> {
        let idx = self
            .catalog
            .items()
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CatalogError::UnknownGarment(id.to_string()))?;
        self.selected = Some(idx);
        Ok(&self.catalog.items()[idx])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // Export

    /// Whether an export is in flight.
    pub fn is_exporting(&self) -> bool {
        self.busy.get()
    }

    /// Label of the export button.
    pub fn export_label(&self) -> &'static str {
        if self.is_exporting() {
            "Готовим..."
        } else {
            "Скачать PNG"
        }
    }

    /// First export phase: validate, take the busy flag and draw the frame.
    ///
    /// `native` may be zero when the camera has not reported a frame size;
    /// the rounded preview size is used then. Nothing in the session is
    /// changed when this fails.
    pub fn begin_export(
        &self,
        frame: Option<&Raster>,
        native: NativeGeometry,
        preview: Option<PreviewGeometry>,
    ) -> Result<PendingExport, ExportError> {
        let preview = preview.ok_or(ExportError::MissingPreview)?;
        let frame = frame.ok_or(ExportError::MissingFrame)?;
        let busy = BusyGuard::acquire(&self.busy).ok_or(ExportError::Busy)?;

        let size = surface_size(preview, native)?;
        let options = self.composite_options();
        let surface = draw_frame(frame, size, options.filter)?;

        let garment = self.selected().cloned();
        log::debug!(
            "export started: {}x{} surface, garment {:?}",
            size.width,
            size.height,
            garment.as_ref().map(|item| item.id.as_str())
        );

        Ok(PendingExport {
            surface,
            preview,
            transform: self.transform,
            garment,
            _busy: busy,
        })
    }

    /// Second export phase: draw the garment, encode and record the look.
    ///
    /// `garment` must be the decoded image of [`PendingExport::garment`]; it
    /// is ignored for a frame-only export. `pending` must come from this
    /// session's [`FittingRoom::begin_export`].
    pub fn complete_export(
        &mut self,
        mut pending: PendingExport,
        garment: Option<&Raster>,
    ) -> Result<&ExportedLook, ExportError> {
        if !pending._busy.guards(&self.busy) {
            return Err(ExportError::ForeignExport);
        }
        if pending.garment.is_some() {
            let image = garment.ok_or(ExportError::MissingGarmentImage)?;
            composite_garment(
                &mut pending.surface,
                image,
                &pending.transform,
                pending.preview,
                self.composite_options(),
            )?;
        }

        let png = encode_png(&pending.surface)?;
        let look = ExportedLook {
            id: self.next_id,
            mood: pending.mood(),
            title: pending.title().to_string(),
            file_name: pending.file_name(),
            width: pending.surface.width,
            height: pending.surface.height,
            png,
        };
        self.next_id += 1;
        log::debug!("export {} finished: {} bytes", look.id, look.png.len());

        drop(pending);
        Ok(self.history.push(look))
    }

    /// Run both phases, loading the garment through `loader`.
    pub fn export<L: GarmentLoader>(
        &mut self,
        frame: Option<&Raster>,
        native: NativeGeometry,
        preview: Option<PreviewGeometry>,
        loader: &mut L,
    ) -> Result<&ExportedLook, ExportError> {
        let pending = self.begin_export(frame, native, preview)?;
        let garment = match pending.garment() {
            Some(item) => Some(loader.load(item)?),
            None => None,
        };
        self.complete_export(pending, garment.as_ref())
    }

    // History

    pub fn history(&self) -> &LookHistory {
        &self.history
    }

    /// Counter shown next to the history strip, e.g. `2 / 4`.
    pub fn history_badge(&self) -> String {
        format!("{} / {}", self.history.len(), self.history.capacity())
    }

    fn composite_options(&self) -> CompositeOptions {
        CompositeOptions::from(&self.config)
    }
}
