//! Camera session lifecycle.
//!
//! A [`CameraSession`] owns at most one acquired stream. Starting again
//! releases the previous stream before a new one is requested, and dropping
//! the session releases whatever it still holds, so a device handle cannot
//! outlive the fitting room that opened it.
//!
//! Acquisition itself is asynchronous in the browser, so the session can be
//! driven in two steps ([`CameraSession::begin`], then
//! [`CameraSession::attach`] or [`CameraSession::fail`]) or in one step with
//! a synchronous [`CameraDevice`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::IDEAL_CAMERA_WIDTH;

/// Shown when the user denied camera access.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Разрешите доступ к камере в настройках браузера и перезапустите модуль.";

/// Shown for every other acquisition failure.
pub const DEVICE_FAILURE_MESSAGE: &str =
    "Не удалось запустить камеру. Проверьте устройство и попробуйте снова.";

/// Hint shown under the preview while the camera is live.
pub const READY_HINT: &str = "Камера включена. Держите ракурс ровно для примерки.";

/// Camera acquisition failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera device error: {0}")]
    Device(String),
}

impl CameraError {
    /// Classify a DOM exception by its `name`.
    pub fn from_dom_error(name: &str) -> Self {
        match name {
            "NotAllowedError" => CameraError::PermissionDenied,
            other => CameraError::Device(other.to_string()),
        }
    }

    /// Fixed localized copy for the user.
    pub fn message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => PERMISSION_DENIED_MESSAGE,
            CameraError::Device(_) => DEVICE_FAILURE_MESSAGE,
        }
    }
}

/// Which camera to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera.
    #[default]
    User,
    Environment,
}

/// What the session requests from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::User,
            ideal_width: IDEAL_CAMERA_WIDTH,
        }
    }
}

impl CameraConstraints {
    /// The `MediaStreamConstraints` object for `getUserMedia`.
    pub fn media_constraints(&self) -> MediaConstraints {
        MediaConstraints {
            video: VideoConstraints {
                facing_mode: self.facing_mode,
                width: IdealValue {
                    ideal: self.ideal_width,
                },
            },
        }
    }
}

/// Serializable `{ video: { facingMode, width: { ideal } } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub width: IdealValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealValue {
    pub ideal: u32,
}

/// Lifecycle state shown by the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

impl CameraStatus {
    /// Badge text over the preview.
    pub fn badge(self) -> &'static str {
        match self {
            CameraStatus::Ready => "Live",
            CameraStatus::Loading => "Запрос камеры...",
            CameraStatus::Idle | CameraStatus::Error => "Отключено",
        }
    }
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CameraStatus::Idle => "idle",
            CameraStatus::Loading => "loading",
            CameraStatus::Ready => "ready",
            CameraStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Releases streams handed out by a camera.
///
/// Split from [`CameraDevice`] because in the browser acquisition is
/// asynchronous and happens outside the session, while release is always
/// synchronous.
pub trait CameraRelease {
    type Stream;

    /// Stop every track of the stream and free the hardware.
    fn release(&mut self, stream: Self::Stream);
}

/// Synchronous source of camera streams.
pub trait CameraDevice: CameraRelease {
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<Self::Stream, CameraError>;
}

type StatusListener = Box<dyn FnMut(CameraStatus, Option<&str>)>;

/// Owner of the live camera stream.
pub struct CameraSession<D: CameraRelease> {
    device: D,
    constraints: CameraConstraints,
    stream: Option<D::Stream>,
    status: CameraStatus,
    error: Option<CameraError>,
    listener: Option<StatusListener>,
}

impl<D: CameraRelease> CameraSession<D> {
    pub fn new(device: D, constraints: CameraConstraints) -> Self {
        Self {
            device,
            constraints,
            stream: None,
            status: CameraStatus::Idle,
            error: None,
            listener: None,
        }
    }

    /// Register a callback for status changes. The second argument is the
    /// user-facing error message, present only in the error state.
    pub fn on_status(&mut self, listener: impl FnMut(CameraStatus, Option<&str>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn constraints(&self) -> &CameraConstraints {
        &self.constraints
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    /// Message to show under the preview: the error copy, or the live hint.
    pub fn message(&self) -> Option<&'static str> {
        match (&self.error, self.status) {
            (Some(err), _) => Some(err.message()),
            (None, CameraStatus::Ready) => Some(READY_HINT),
            _ => None,
        }
    }

    pub fn stream(&self) -> Option<&D::Stream> {
        self.stream.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// First half of a (re)start: release the current stream and enter the
    /// loading state. Returns the constraints to request.
    pub fn begin(&mut self) -> CameraConstraints {
        self.release_stream();
        self.error = None;
        self.set_status(CameraStatus::Loading);
        self.constraints
    }

    /// Second half of a successful start.
    pub fn attach(&mut self, stream: D::Stream) {
        // attach without begin may still hold a stream
        self.release_stream();
        self.stream = Some(stream);
        self.error = None;
        self.set_status(CameraStatus::Ready);
    }

    /// Second half of a failed start.
    pub fn fail(&mut self, error: CameraError) {
        log::warn!("camera start failed: {}", error);
        self.release_stream();
        self.error = Some(error);
        self.set_status(CameraStatus::Error);
    }

    /// Release the stream and return to idle.
    pub fn stop(&mut self) {
        self.release_stream();
        self.error = None;
        self.set_status(CameraStatus::Idle);
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("releasing camera stream");
            self.device.release(stream);
        }
    }

    fn set_status(&mut self, status: CameraStatus) {
        if self.status != status {
            log::debug!("camera status {} -> {}", self.status, status);
        }
        self.status = status;
        let message = self.error.as_ref().map(CameraError::message);
        if let Some(listener) = self.listener.as_mut() {
            listener(status, message);
        }
    }
}

impl<D: CameraDevice> CameraSession<D> {
    /// Start (or restart) synchronously against the owned device.
    pub fn start(&mut self) -> Result<(), CameraError> {
        let constraints = self.begin();
        match self.device.acquire(&constraints) {
            Ok(stream) => {
                self.attach(stream);
                Ok(())
            }
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }
}

impl<D: CameraRelease> Drop for CameraSession<D> {
    fn drop(&mut self) {
        self.release_stream();
    }
}

impl<D: CameraRelease> fmt::Debug for CameraSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSession")
            .field("constraints", &self.constraints)
            .field("status", &self.status)
            .field("active", &self.stream.is_some())
            .field("error", &self.error)
            .finish()
    }
}
