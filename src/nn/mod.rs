//! Gesture classifier inference.

pub mod bundle;

use std::path::Path;

use anyhow::{bail, Context};
use itertools::{zip_eq, Itertools};
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::feature::FEATURE_LEN;
use crate::num::{relu, softmax};

use self::bundle::{LayerParameters, ParameterBundle};

/// Widths of the two hidden layers.
const HIDDEN_WIDTHS: [usize; 2] = [128, 64];

/// A dense layer computing `weight · x + bias`.
#[derive(Debug)]
struct DenseLayer {
    weight: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    fn from_params(params: &LayerParameters, inputs: usize, outputs: usize) -> anyhow::Result<Self> {
        if params.weight.len() != outputs {
            bail!(
                "weight matrix has {} rows, expected {}",
                params.weight.len(),
                outputs,
            );
        }

        let mut flat = Vec::with_capacity(outputs * inputs);
        for (i, row) in params.weight.iter().enumerate() {
            if row.len() != inputs {
                bail!("weight row {} has {} columns, expected {}", i, row.len(), inputs);
            }
            flat.extend_from_slice(row);
        }
        let weight = Array2::from_shape_vec((outputs, inputs), flat)?;

        if params.bias.len() != outputs {
            bail!(
                "bias vector has {} elements, expected {}",
                params.bias.len(),
                outputs,
            );
        }
        let bias = Array1::from_vec(params.bias.clone());

        Ok(Self { weight, bias })
    }

    fn forward(&self, input: &Array1<f32>) -> Array1<f32> {
        self.weight.dot(input) + &self.bias
    }
}

/// The classifier's verdict for a single feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// The highest-probability gesture class.
    pub label: String,
    /// That class's probability as a percentage in `(0, 100]`.
    pub confidence: f32,
}

/// A trained two-hand gesture classifier.
///
/// The network is a fixed feed-forward architecture: 84 inputs, two
/// ReLU-activated hidden layers of 128 and 64 neurons, and a softmax output
/// over the gesture vocabulary. Dropout is a training-time regularizer only
/// and does not exist here, so inference is deterministic for a fixed bundle.
///
/// A classifier is built once at startup and is immutable afterwards, so it
/// can be shared across concurrent inference calls without locking.
#[derive(Debug)]
pub struct GestureClassifier {
    class_names: Vec<String>,
    layers: Vec<DenseLayer>,
}

impl GestureClassifier {
    /// Loads a classifier from the parameter bundle at `path`.
    ///
    /// Returns an error if the bundle cannot be read or its shapes do not
    /// match the fixed architecture. Callers are expected to treat this as
    /// fatal at startup; a process without a classifier cannot serve anything.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::from_bundle(&ParameterBundle::load(path)?)
    }

    /// Builds a classifier from an in-memory parameter bundle.
    pub fn from_bundle(bundle: &ParameterBundle) -> anyhow::Result<Self> {
        if bundle.class_names.is_empty() {
            bail!("parameter bundle contains no gesture classes");
        }
        if let Some(dup) = bundle.class_names.iter().duplicates().next() {
            bail!("parameter bundle lists gesture class `{dup}` more than once");
        }

        let mut widths = vec![FEATURE_LEN];
        widths.extend(HIDDEN_WIDTHS);
        widths.push(bundle.class_names.len());

        if bundle.layers.len() != widths.len() - 1 {
            bail!(
                "classifier has to consist of exactly {} dense layers, this bundle contains {}",
                widths.len() - 1,
                bundle.layers.len(),
            );
        }

        let mut layers = Vec::with_capacity(bundle.layers.len());
        for (i, (params, shape)) in zip_eq(&bundle.layers, widths.windows(2)).enumerate() {
            let layer = DenseLayer::from_params(params, shape[0], shape[1])
                .with_context(|| format!("invalid dense layer {i}"))?;
            layers.push(layer);
        }

        Ok(Self {
            class_names: bundle.class_names.clone(),
            layers,
        })
    }

    /// Returns the gesture classes this classifier distinguishes, in output
    /// layer order.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Computes the full probability distribution over the gesture classes.
    ///
    /// # Panics
    ///
    /// Panics if `features` does not have exactly [`FEATURE_LEN`] elements.
    pub fn probabilities(&self, features: &Array1<f32>) -> Array1<f32> {
        assert_eq!(
            features.len(),
            FEATURE_LEN,
            "classifier input has to contain exactly {FEATURE_LEN} features",
        );

        let (output_layer, hidden_layers) =
            self.layers.split_last().expect("layer list is never empty");

        let mut activation = features.to_owned();
        for layer in hidden_layers {
            activation = layer.forward(&activation);
            activation.mapv_inplace(relu);
        }

        softmax(&output_layer.forward(&activation))
    }

    /// Classifies a feature vector, returning the most probable gesture.
    ///
    /// The reported confidence is the class probability expressed as a
    /// percentage; it always lies in `(0, 100]`.
    pub fn classify(&self, features: &Array1<f32>) -> Classification {
        let probs = self.probabilities(features);
        let index = probs
            .iter()
            .copied()
            .position_max_by(|a, b| a.total_cmp(b))
            .expect("class list is never empty");

        Classification {
            label: self.class_names[index].clone(),
            confidence: probs[index] * 100.0,
        }
    }
}
