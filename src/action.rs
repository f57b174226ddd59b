//! Aggregation of per-frame gestures into actions and phrases.
//!
//! A classifier verdict exists per frame, which makes raw label streams noisy:
//! a signer holding one gesture for a second still produces the occasional
//! misclassified frame. [`ActionSmoother`] collapses such a stream into the
//! sequence of actions that were actually held, and [`PhraseTable`] maps a set
//! of recognized actions to a phrase.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Collapses a stream of noisy per-frame gesture labels into discrete actions.
///
/// The stream is scanned with a sliding window. Each window elects its most
/// frequent label; the label is emitted only if it covers at least the
/// configured share of the window, otherwise the window is discarded as too
/// ambiguous.
#[derive(Debug, Clone)]
pub struct ActionSmoother {
    window: usize,
    step: usize,
    threshold: f32,
}

impl Default for ActionSmoother {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            step: Self::DEFAULT_STEP,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl ActionSmoother {
    pub const DEFAULT_WINDOW: usize = 5;

    pub const DEFAULT_STEP: usize = 5;

    pub const DEFAULT_THRESHOLD: f32 = 0.6;

    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of frames considered per window.
    ///
    /// # Panics
    ///
    /// Panics when `window` is 0.
    pub fn set_window(&mut self, window: usize) {
        assert!(window > 0);
        self.window = window;
    }

    /// Sets how many frames the window advances between votes.
    ///
    /// # Panics
    ///
    /// Panics when `step` is 0.
    pub fn set_step(&mut self, step: usize) {
        assert!(step > 0);
        self.step = step;
    }

    /// Sets the share of the window the winning label has to cover for the
    /// window to produce an action.
    ///
    /// # Panics
    ///
    /// Panics when `threshold` is not in `(0.0, 1.0]`.
    pub fn set_threshold(&mut self, threshold: f32) {
        assert!(threshold > 0.0 && threshold <= 1.0);
        self.threshold = threshold;
    }

    /// Reduces per-frame labels to the actions they spell out.
    pub fn smooth<S: AsRef<str>>(&self, frames: &[S]) -> Vec<String> {
        let mut actions = Vec::new();

        let mut i = 0;
        while i < frames.len() {
            let window = &frames[i..frames.len().min(i + self.window)];
            if let Some(winner) = majority(window) {
                let (label, count) = winner;
                if count as f32 / window.len() as f32 >= self.threshold {
                    actions.push(label.to_string());
                }
            }
            i += self.step;
        }

        actions
    }
}

/// Returns the most frequent label in `window` and its count.
///
/// Ties resolve to the label that appears first in the window.
fn majority<S: AsRef<str>>(window: &[S]) -> Option<(&str, usize)> {
    let mut winner: Option<(&str, usize)> = None;
    for (i, frame) in window.iter().enumerate() {
        let label = frame.as_ref();
        if window[..i].iter().any(|prev| prev.as_ref() == label) {
            continue;
        }

        let count = window.iter().filter(|f| f.as_ref() == label).count();
        if winner.map_or(true, |(_, max)| count > max) {
            winner = Some((label, count));
        }
    }
    winner
}

/// Maps sets of recognized actions to phrases.
///
/// The table is persisted as a JSON object from phrase to the actions that
/// spell it, for example `{"how are you": ["how", "you"]}`. Lookup compares
/// *sets*: action order and repetition do not matter, and empty action strings
/// in the table are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PhraseTable {
    phrases: BTreeMap<String, Vec<String>>,
}

impl PhraseTable {
    /// Reads and parses a phrase table from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read phrase table `{}`", path.display()))?;
        let table = serde_json::from_str::<Self>(&json)
            .with_context(|| format!("failed to parse phrase table `{}`", path.display()))?;
        Ok(table)
    }

    /// Returns the phrase spelled by `actions`, if the table contains one.
    pub fn phrase_for<S: AsRef<str>>(&self, actions: &[S]) -> Option<&str> {
        let wanted: BTreeSet<&str> = actions.iter().map(|a| a.as_ref()).collect();

        self.phrases
            .iter()
            .find(|(_, actions)| {
                let spelled: BTreeSet<&str> = actions
                    .iter()
                    .map(|a| a.as_str())
                    .filter(|a| !a.is_empty())
                    .collect();
                spelled == wanted
            })
            .map(|(phrase, _)| phrase.as_str())
    }
}
