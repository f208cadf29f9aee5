//! Image encoding for exported looks.
//!
//! Exports are always PNG: lossless, with the alpha channel of the export
//! surface preserved. The [`to_data_url`] form is what the page hands to the
//! download link and the history strip.

mod png;

pub use png::{encode_png, to_data_url, EncodeError, PNG_MIME};
