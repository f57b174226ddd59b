//! Feature vector assembly for the gesture classifier.

use itertools::zip_eq;
use ndarray::Array1;

use crate::hand::{Hand, NUM_LANDMARKS};

/// Number of feature values contributed by a single hand.
pub const FEATURES_PER_HAND: usize = 2 * NUM_LANDMARKS;

/// Length of the classifier input vector (two hand slots).
pub const FEATURE_LEN: usize = 2 * FEATURES_PER_HAND;

/// Keeps the z-score denominator finite when all coordinates coincide.
const EPSILON: f32 = 1e-6;

/// The hands retained for a single classification.
///
/// At most two hands enter the feature vector. Modeling the count as an explicit
/// variant makes the padding and truncation policy a visible branch instead of
/// loop bookkeeping.
#[derive(Debug, Clone, Copy)]
pub enum RetainedHands<'a> {
    Zero,
    One(&'a Hand),
    Two(&'a Hand, &'a Hand),
}

impl<'a> RetainedHands<'a> {
    /// Retains the first two hands, in detection order.
    ///
    /// Any hands past the second are dropped. Detection order is kept as-is
    /// rather than sorting by handedness; the classifier's weights are trained
    /// against the estimator's ordering.
    pub fn from_detections(hands: &'a [Hand]) -> Self {
        match hands {
            [] => Self::Zero,
            [hand] => Self::One(hand),
            [first, second, ..] => Self::Two(first, second),
        }
    }

    /// Returns the number of retained hands.
    pub fn len(&self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Zero)
    }
}

/// Z-score normalizes a hand's landmark coordinates.
///
/// Returns the 21 normalized X coordinates followed by the 21 normalized Y
/// coordinates. The axes are normalized independently: each coordinate set is
/// shifted by its mean and scaled by its population standard deviation. This
/// never fails; a degenerate hand with all landmarks coincident produces
/// near-zero output instead of dividing by zero.
pub fn normalize_hand(hand: &Hand) -> [f32; FEATURES_PER_HAND] {
    let mut out = [0.0; FEATURES_PER_HAND];
    let (xs, ys) = out.split_at_mut(NUM_LANDMARKS);
    write_normalized(hand.xs(), xs);
    write_normalized(hand.ys(), ys);
    out
}

fn write_normalized(coords: impl Iterator<Item = f32> + Clone, out: &mut [f32]) {
    let len = out.len() as f32;
    let mean = coords.clone().sum::<f32>() / len;
    let var = coords.clone().map(|v| (v - mean) * (v - mean)).sum::<f32>() / len;
    let std = var.sqrt();
    for (slot, v) in zip_eq(out, coords) {
        *slot = (v - mean) / (std + EPSILON);
    }
}

/// Builds the classifier input vector.
///
/// The output always has exactly [`FEATURE_LEN`] elements: each retained hand is
/// normalized via [`normalize_hand`] and written to its slot in detection order,
/// unused slots stay zero. This is a pure transformation.
pub fn encode(hands: RetainedHands<'_>) -> Array1<f32> {
    let mut features = vec![0.0; FEATURE_LEN];
    match hands {
        RetainedHands::Zero => {}
        RetainedHands::One(hand) => {
            features[..FEATURES_PER_HAND].copy_from_slice(&normalize_hand(hand));
        }
        RetainedHands::Two(first, second) => {
            features[..FEATURES_PER_HAND].copy_from_slice(&normalize_hand(first));
            features[FEATURES_PER_HAND..].copy_from_slice(&normalize_hand(second));
        }
    }
    Array1::from_vec(features)
}
