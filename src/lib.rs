//! Mudra sign language gesture recognition.
//!
//! An external hand pose estimator supplies, for every hand it finds in a camera
//! frame, 21 landmark coordinates and a handedness label. This crate turns that
//! raw geometry into a fixed-size feature vector, runs it through a small
//! feed-forward network, and reports the recognized gesture together with a
//! confidence value. Everything around it (transport, image decoding, the pose
//! estimator itself) stays outside; the estimator is reached through the
//! [`detect::HandDetector`] trait.
//!
//! # Feature Layout
//!
//! Each hand contributes 42 values: its 21 z-score normalized X coordinates
//! followed by its 21 z-score normalized Y coordinates. The classifier input
//! always holds two hand slots in detection order, absent hands are encoded as
//! zeros, for a total of 84 values. Detection order is preserved as-is since the
//! classifier's weights are trained against the estimator's ordering.

use log::LevelFilter;

pub mod action;
pub mod detect;
pub mod feature;
pub mod hand;
pub mod nn;
pub mod num;
pub mod pipeline;
pub mod timer;

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
/// The calling crate and this library will log at *debug* level; the `RUST_LOG`
/// environment variable can override this.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
