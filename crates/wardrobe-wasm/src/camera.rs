//! Camera bindings.
//!
//! The page calls `getUserMedia` itself; this module tells it what to ask
//! for, owns the resulting `MediaStream`, and stops its tracks on restart,
//! on `stop()` and when the session is freed.
//!
//! ```typescript
//! const camera = new JsCameraSession();
//! camera.on_status((status, message) => render(status, message));
//! const constraints = camera.begin();
//! try {
//!   camera.attach(await navigator.mediaDevices.getUserMedia(constraints));
//! } catch (e) {
//!   camera.fail(e.name);
//! }
//! ```

use wardrobe_core::camera::{CameraConstraints, CameraError, CameraRelease, CameraSession};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MediaStream, MediaStreamTrack};

/// Stops every track of a released `MediaStream`.
#[derive(Debug, Default)]
pub(crate) struct TrackStopper;

impl CameraRelease for TrackStopper {
    type Stream = MediaStream;

    fn release(&mut self, stream: MediaStream) {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// Localized message for a `getUserMedia` failure, by DOM exception name.
#[wasm_bindgen]
pub fn camera_error_message(name: &str) -> String {
    CameraError::from_dom_error(name).message().to_string()
}

/// Default `getUserMedia` constraints: front camera, ideal width 1280.
#[wasm_bindgen]
pub fn camera_constraints() -> Result<JsValue, JsValue> {
    constraints_to_js(&CameraConstraints::default())
}

pub(crate) fn constraints_to_js(constraints: &CameraConstraints) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&constraints.media_constraints())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Owner of the live camera stream.
#[wasm_bindgen]
pub struct JsCameraSession {
    inner: CameraSession<TrackStopper>,
}

#[wasm_bindgen]
impl JsCameraSession {
    /// Create an idle session. `ideal_width` defaults to 1280.
    #[wasm_bindgen(constructor)]
    pub fn new(ideal_width: Option<u32>) -> JsCameraSession {
        let mut constraints = CameraConstraints::default();
        if let Some(width) = ideal_width.filter(|&w| w > 0) {
            constraints.ideal_width = width;
        }
        Self {
            inner: CameraSession::new(TrackStopper, constraints),
        }
    }

    /// Register `callback(status, message)`; `message` is null unless the
    /// status is `error`.
    pub fn on_status(&mut self, callback: js_sys::Function) {
        self.inner.on_status(move |status, message| {
            let message = message.map_or(JsValue::NULL, JsValue::from_str);
            if let Err(err) = callback.call2(&JsValue::NULL, &JsValue::from_str(&status.to_string()), &message) {
                log::warn!("camera status callback threw: {:?}", err);
            }
        });
    }

    /// Release any current stream, enter `loading` and return the
    /// constraints to pass to `getUserMedia`.
    pub fn begin(&mut self) -> Result<JsValue, JsValue> {
        let constraints = self.inner.begin();
        constraints_to_js(&constraints)
    }

    /// Hand over the stream returned by `getUserMedia`.
    pub fn attach(&mut self, stream: MediaStream) {
        self.inner.attach(stream);
    }

    /// Report a `getUserMedia` failure by DOM exception name.
    pub fn fail(&mut self, name: &str) {
        self.inner.fail(CameraError::from_dom_error(name));
    }

    /// Stop the camera.
    pub fn stop(&mut self) {
        self.inner.stop();
    }

    /// The live stream, for `video.srcObject`.
    #[wasm_bindgen(getter)]
    pub fn stream(&self) -> Option<MediaStream> {
        self.inner.stream().cloned()
    }

    /// `idle`, `loading`, `ready` or `error`.
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        self.inner.status().to_string()
    }

    /// Badge text over the preview.
    #[wasm_bindgen(getter)]
    pub fn badge(&self) -> String {
        self.inner.status().badge().to_string()
    }

    /// Error copy, or the hint shown while the camera is live.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.inner.message().map(str::to_string)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_constraints_object_shape() {
        let value = camera_constraints().unwrap();
        let video = js_sys::Reflect::get(&value, &"video".into()).unwrap();
        let facing = js_sys::Reflect::get(&video, &"facingMode".into()).unwrap();
        let width = js_sys::Reflect::get(&video, &"width".into()).unwrap();
        let ideal = js_sys::Reflect::get(&width, &"ideal".into()).unwrap();
        assert_eq!(facing.as_string().as_deref(), Some("user"));
        assert_eq!(ideal.as_f64(), Some(1280.0));
    }

    #[wasm_bindgen_test]
    fn test_begin_enters_loading() {
        let mut session = JsCameraSession::new(None);
        session.begin().unwrap();
        assert_eq!(session.status(), "loading");
        assert_eq!(session.badge(), "Запрос камеры...");
    }

    #[wasm_bindgen_test]
    fn test_attach_and_stop_empty_stream() {
        let mut session = JsCameraSession::new(None);
        session.begin().unwrap();
        session.attach(MediaStream::new().unwrap());
        assert_eq!(session.status(), "ready");
        assert!(session.stream().is_some());
        session.stop();
        assert!(session.stream().is_none());
    }
}
