//! Hand landmark data produced by the pose estimator.

use serde::Serialize;

/// The number of landmarks that make up a [`Hand`].
pub const NUM_LANDMARKS: usize = 21;

/// A hand keypoint in image-relative coordinates.
///
/// Both coordinates lie in `[0.0, 1.0]`, with the origin in the image's top left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    x: f32,
    y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.y
    }
}

/// Which of a person's hands a detection belongs to.
///
/// Estimators assign this on a best-effort basis; a mirrored camera image flips
/// the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Handedness {
    Left,
    Right,
}

/// A detected hand: exactly [`NUM_LANDMARKS`] landmarks in the estimator's fixed
/// order, plus the estimated [`Handedness`].
///
/// Hands are transient values, created from one frame's detector output and
/// discarded after that frame's classification.
#[derive(Debug, Clone, Serialize)]
pub struct Hand {
    handedness: Handedness,
    landmarks: [Landmark; NUM_LANDMARKS],
}

impl Hand {
    pub fn new(handedness: Handedness, landmarks: [Landmark; NUM_LANDMARKS]) -> Self {
        Self {
            handedness,
            landmarks,
        }
    }

    #[inline]
    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    #[inline]
    pub fn landmarks(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.landmarks
    }

    /// Returns the landmark X coordinates in landmark order.
    pub fn xs(&self) -> impl Iterator<Item = f32> + Clone + '_ {
        self.landmarks.iter().map(|lm| lm.x)
    }

    /// Returns the landmark Y coordinates in landmark order.
    pub fn ys(&self) -> impl Iterator<Item = f32> + Clone + '_ {
        self.landmarks.iter().map(|lm| lm.y)
    }
}
