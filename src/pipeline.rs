//! The per-frame classification pipeline.
//!
//! [`Pipeline`] ties the pieces together: an incoming camera frame is handed to
//! the pose estimator, the detected hands are encoded into the classifier's
//! feature vector, and the classifier's verdict is packaged into an [`Outcome`]
//! for the caller. Each frame runs through the stages synchronously; the
//! pipeline keeps no per-request state beyond its profiling timers.

use serde::Serialize;

use crate::detect::{DetectError, HandDetector};
use crate::feature::{self, RetainedHands};
use crate::hand::Hand;
use crate::nn::{Classification, GestureClassifier};
use crate::timer::Timer;

/// The result of classifying a single frame.
///
/// Expected per-frame conditions are ordinary variants of this type rather
/// than errors, so the caller can serialize whichever one occurs and is never
/// left guessing whether a failure meant "no hand".
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// At least one hand was found and classified.
    Success {
        /// Raw landmarks and handedness per detected hand, in detection order,
        /// for downstream visualization.
        hands: Vec<Hand>,
        /// The recognized gesture.
        classification: Classification,
    },
    /// The estimator found no hands; no classification was attempted.
    NoHandDetected,
    /// The frame could not be decoded into pixel data.
    ImageDecodeError { reason: String },
    /// An unanticipated failure inside the pipeline. The full error chain is
    /// logged; `reason` carries it to the caller in serialized form.
    InternalError { reason: String },
}

/// Classifies camera frames into sign language gestures.
///
/// A pipeline is constructed once at startup from a loaded
/// [`GestureClassifier`] and a [`HandDetector`] and is handed to the transport
/// layer, which feeds it one frame per request.
pub struct Pipeline {
    detector: Box<dyn HandDetector>,
    classifier: GestureClassifier,
    t_detect: Timer,
    t_encode: Timer,
    t_classify: Timer,
}

impl Pipeline {
    /// Creates a pipeline from its two collaborators.
    pub fn new<D: HandDetector + 'static>(detector: D, classifier: GestureClassifier) -> Self {
        Self {
            detector: Box::new(detector),
            classifier,
            t_detect: Timer::new("detect"),
            t_encode: Timer::new("encode"),
            t_classify: Timer::new("classify"),
        }
    }

    /// Returns the classifier the pipeline was created with.
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Returns profiling timers for the pipeline stages.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_detect, &self.t_encode, &self.t_classify].into_iter()
    }

    /// Classifies a single encoded camera frame.
    ///
    /// Expected conditions (no hand in view, undecodable frame) come back as
    /// their [`Outcome`] variants. Anything unanticipated is caught here,
    /// logged at error level, and reported as [`Outcome::InternalError`]
    /// instead of tearing down the serving process.
    pub fn process(&mut self, image: &[u8]) -> Outcome {
        match self.process_inner(image) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("gesture pipeline failed: {e:#}");
                Outcome::InternalError {
                    reason: format!("{e:#}"),
                }
            }
        }
    }

    fn process_inner(&mut self, image: &[u8]) -> anyhow::Result<Outcome> {
        let detector = &mut self.detector;
        let hands = match self.t_detect.time(|| detector.detect(image)) {
            Ok(hands) => hands,
            Err(DetectError::ImageDecode(reason)) => {
                log::warn!("failed to decode frame: {reason}");
                return Ok(Outcome::ImageDecodeError { reason });
            }
            Err(DetectError::Other(e)) => return Err(e.context("hand detection failed")),
        };

        if hands.is_empty() {
            log::debug!("no hand detected");
            return Ok(Outcome::NoHandDetected);
        }

        let features = self
            .t_encode
            .time(|| feature::encode(RetainedHands::from_detections(&hands)));
        let classification = self.t_classify.time(|| self.classifier.classify(&features));
        log::debug!(
            "{} hand(s) -> {} ({:.1}%)",
            hands.len(),
            classification.label,
            classification.confidence,
        );

        Ok(Outcome::Success {
            hands,
            classification,
        })
    }
}
