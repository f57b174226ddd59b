//! Parameter bundle loading.
//!
//! A trained classifier is persisted as a single JSON artifact holding the
//! gesture vocabulary next to the dense layers' parameters:
//!
//! ```json
//! {
//!     "class_names": ["hello", "thanks", "yes"],
//!     "layers": [
//!         { "weight": [[0.01, ...], ...], "bias": [0.0, ...] },
//!         ...
//!     ]
//! }
//! ```
//!
//! Layers are ordered from input to output. Each `weight` is a row-major
//! `outputs × inputs` matrix, so `weight[i]` holds the input coefficients of
//! output neuron `i`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// The persisted parameters of a trained gesture classifier.
///
/// A bundle is loaded once at process startup and never mutated; after the
/// classifier is built from it, all inference calls share the derived weights
/// read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterBundle {
    /// The gesture vocabulary, ordered to match the output layer.
    pub class_names: Vec<String>,
    /// Dense layer parameters, ordered from input to output.
    pub layers: Vec<LayerParameters>,
}

/// The learned parameters of a single dense layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerParameters {
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl ParameterBundle {
    /// Reads and parses a parameter bundle from `path`.
    ///
    /// This only checks that the artifact is well-formed; whether the layer
    /// shapes match the classifier architecture is verified when the classifier
    /// is built from the bundle.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read parameter bundle `{}`", path.display()))?;
        let bundle = serde_json::from_str::<Self>(&json)
            .with_context(|| format!("failed to parse parameter bundle `{}`", path.display()))?;
        Ok(bundle)
    }
}
