//! The hand pose estimator boundary.

use thiserror::Error;

use crate::hand::Hand;

/// Capability interface to the external hand pose estimator.
///
/// Implementations decode the supplied image bytes into pixel data and return
/// every detected hand with its handedness label and 21 landmarks, in the
/// estimator's detection order. Estimators are expected to cap detections at
/// two hands; the pipeline truncates defensively either way.
///
/// Detection takes `&mut self` because estimators commonly carry tracking
/// state between frames. A detector shared between threads therefore has to be
/// serialized or instantiated per request by the caller; the pipeline performs
/// no locking of its own.
pub trait HandDetector {
    /// Runs hand detection on an encoded camera frame.
    fn detect(&mut self, image: &[u8]) -> Result<Vec<Hand>, DetectError>;
}

/// Errors reported by a [`HandDetector`].
#[derive(Debug, Error)]
pub enum DetectError {
    /// The supplied bytes could not be decoded into pixel data.
    ///
    /// This is an expected per-frame condition and is reported to the caller
    /// as such, distinct from estimator malfunctions.
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// Any other estimator failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
