//! Mudra — teachable hand gesture recognition.
//!
//! Turns per-frame hand-landmark detections into wrist-relative feature
//! vectors, maintains a corpus of labeled examples, trains a bagged
//! decision-tree classifier on it, and recognizes gestures live behind a
//! confidence gate. Trained classifiers and their corpora are persisted as
//! versioned snapshots and restored at startup.
//!
//! The hand-landmark *detector* and the camera loop are external
//! collaborators: anything that yields 21 ordered landmarks per hand (wrist
//! first, positions normalized to the image) can drive a
//! [`session::GestureSession`], either directly through
//! [`session::GestureSession::on_frame`] or via the [`source::DetectionSource`]
//! seam used by the interactive binary.

use log::LevelFilter;

pub mod classify;
pub mod corpus;
pub mod feature;
pub mod forest;
pub mod landmark;
pub mod session;
pub mod source;
pub mod store;
pub mod train;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library log at *debug* level; everything else
/// stays at the `env_logger` default unless overridden via `RUST_LOG`.
///
/// If a global logger is already registered, this macro does nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
