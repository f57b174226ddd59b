//! Utilities for numerics.

use ndarray::Array1;

/// Applies the rectified linear unit to the input.
pub fn relu(v: f32) -> f32 {
    v.max(0.0)
}

/// Maps a vector of raw scores to a probability distribution summing to 1.
///
/// The maximum score is subtracted before exponentiation so that large scores
/// cannot overflow to infinity; the result is unchanged by the shift.
pub fn softmax(scores: &Array1<f32>) -> Array1<f32> {
    let max = scores.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let exp = scores.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
