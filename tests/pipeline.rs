//! End-to-end tests of the frame classification pipeline, driven by a scripted
//! stand-in for the external pose estimator.

use std::collections::VecDeque;

use approx::assert_abs_diff_eq;
use mudra::detect::{DetectError, HandDetector};
use mudra::feature::{self, RetainedHands, FEATURE_LEN};
use mudra::hand::{Hand, Handedness, Landmark};
use mudra::nn::bundle::{LayerParameters, ParameterBundle};
use mudra::nn::GestureClassifier;
use mudra::pipeline::{Outcome, Pipeline};

/// Replays a fixed list of detector responses, one per processed frame.
struct ScriptedDetector {
    responses: VecDeque<Result<Vec<Hand>, DetectError>>,
}

impl ScriptedDetector {
    fn new(responses: impl IntoIterator<Item = Result<Vec<Hand>, DetectError>>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
        }
    }
}

impl HandDetector for ScriptedDetector {
    fn detect(&mut self, _image: &[u8]) -> Result<Vec<Hand>, DetectError> {
        self.responses
            .pop_front()
            .expect("detector called more often than scripted")
    }
}

fn hand(handedness: Handedness, pos: impl Fn(usize) -> (f32, f32)) -> Hand {
    Hand::new(
        handedness,
        std::array::from_fn(|i| {
            let (x, y) = pos(i);
            Landmark::new(x, y)
        }),
    )
}

fn zero_layer(outputs: usize, inputs: usize) -> LayerParameters {
    LayerParameters {
        weight: vec![vec![0.0; inputs]; outputs],
        bias: vec![0.0; outputs],
    }
}

/// A bundle whose verdict ignores the input: all weights are zero and the
/// output layer's bias carries the raw scores.
fn constant_score_bundle(class_names: &[&str], scores: &[f32]) -> ParameterBundle {
    let mut output = zero_layer(scores.len(), 64);
    output.bias = scores.to_vec();

    ParameterBundle {
        class_names: class_names.iter().map(|s| s.to_string()).collect(),
        layers: vec![zero_layer(128, FEATURE_LEN), zero_layer(64, 128), output],
    }
}

/// A bundle with deterministic, non-uniform weights so that different inputs
/// produce different distributions.
fn varied_bundle(class_names: &[&str]) -> ParameterBundle {
    fn layer(outputs: usize, inputs: usize, seed: usize) -> LayerParameters {
        LayerParameters {
            weight: (0..outputs)
                .map(|o| {
                    (0..inputs)
                        .map(|i| (((o * 31 + i * 17 + seed) % 13) as f32 - 6.0) * 0.05)
                        .collect()
                })
                .collect(),
            bias: (0..outputs).map(|o| ((o + seed) % 5) as f32 * 0.1 - 0.2).collect(),
        }
    }

    ParameterBundle {
        class_names: class_names.iter().map(|s| s.to_string()).collect(),
        layers: vec![
            layer(128, FEATURE_LEN, 1),
            layer(64, 128, 2),
            layer(class_names.len(), 64, 3),
        ],
    }
}

fn classifier(bundle: &ParameterBundle) -> GestureClassifier {
    GestureClassifier::from_bundle(bundle).unwrap()
}

fn timer_samples(pipeline: &Pipeline, name: &str) -> usize {
    pipeline
        .timers()
        .find(|t| t.name() == name)
        .unwrap()
        .samples()
}

#[test]
fn empty_frame_short_circuits() {
    mudra::init_logger!();

    let detector = ScriptedDetector::new([Ok(Vec::new())]);
    let bundle = constant_score_bundle(&["hello"], &[1.0]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let outcome = pipeline.process(b"frame");
    assert!(matches!(outcome, Outcome::NoHandDetected));

    // Detection ran, but neither encoding nor classification was reached.
    assert_eq!(timer_samples(&pipeline, "detect"), 1);
    assert_eq!(timer_samples(&pipeline, "encode"), 0);
    assert_eq!(timer_samples(&pipeline, "classify"), 0);
}

#[test]
fn classifies_two_hands_in_detection_order() {
    let right = hand(Handedness::Right, |i| (1.0 - i as f32 / 20.0, 0.25));
    let left = hand(Handedness::Left, |i| (i as f32 / 20.0, 1.0 - i as f32 / 40.0));

    // The estimator happened to report the right hand first.
    let detector = ScriptedDetector::new([Ok(vec![right.clone(), left.clone()])]);
    let bundle = constant_score_bundle(&["hello", "thanks", "yes"], &[2.0, 0.5, 0.1]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let (hands, classification) = match pipeline.process(b"frame") {
        Outcome::Success {
            hands,
            classification,
        } => (hands, classification),
        other => panic!("expected success, got {other:?}"),
    };

    // Raw detector output is passed through untouched, in detection order.
    assert_eq!(hands.len(), 2);
    assert_eq!(hands[0].handedness(), Handedness::Right);
    assert_eq!(hands[1].handedness(), Handedness::Left);
    assert_eq!(hands[0].landmarks(), right.landmarks());

    assert_eq!(classification.label, "hello");
    let expected = 100.0 * 2.0f32.exp() / (2.0f32.exp() + 0.5f32.exp() + 0.1f32.exp());
    assert_abs_diff_eq!(classification.confidence, expected, epsilon = 1e-3);
}

#[test]
fn undecodable_frame_is_an_expected_outcome() {
    let detector = ScriptedDetector::new([Err(DetectError::ImageDecode(
        "not a JPEG stream".to_string(),
    ))]);
    let bundle = constant_score_bundle(&["hello"], &[1.0]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let reason = match pipeline.process(b"garbage") {
        Outcome::ImageDecodeError { reason } => reason,
        other => panic!("expected decode error, got {other:?}"),
    };
    assert_eq!(reason, "not a JPEG stream");
}

#[test]
fn estimator_malfunction_is_caught_at_the_boundary() {
    let detector = ScriptedDetector::new([Err(DetectError::Other(anyhow::anyhow!(
        "pose estimator crashed"
    )))]);
    let bundle = constant_score_bundle(&["hello"], &[1.0]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let reason = match pipeline.process(b"frame") {
        Outcome::InternalError { reason } => reason,
        other => panic!("expected internal error, got {other:?}"),
    };
    assert!(reason.contains("pose estimator crashed"));
}

#[test]
fn inference_is_deterministic() {
    let bundle = varied_bundle(&["hello", "thanks", "yes"]);
    let classifier = classifier(&bundle);

    let hands = vec![
        hand(Handedness::Left, |i| (i as f32 / 21.0, (i % 5) as f32 / 5.0)),
        hand(Handedness::Right, |i| (0.8 - i as f32 / 30.0, 0.1 + i as f32 / 25.0)),
    ];
    let features = feature::encode(RetainedHands::from_detections(&hands));

    let first = classifier.classify(&features);
    let second = classifier.classify(&features);

    assert_eq!(first.label, second.label);
    assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
}

#[test]
fn confidence_stays_in_percent_range() {
    let bundle = varied_bundle(&["a", "b", "c", "d", "e"]);
    let classifier = classifier(&bundle);

    let inputs = [
        vec![],
        vec![hand(Handedness::Left, |_| (0.5, 0.5))],
        vec![
            hand(Handedness::Left, |i| (i as f32 / 21.0, 0.9)),
            hand(Handedness::Right, |i| (0.9, i as f32 / 21.0)),
        ],
    ];

    for hands in &inputs {
        let features = feature::encode(RetainedHands::from_detections(hands));
        let result = classifier.classify(&features);
        assert!(
            result.confidence > 0.0 && result.confidence <= 100.0,
            "confidence {} out of range",
            result.confidence,
        );

        let percent_sum = classifier.probabilities(&features).sum() * 100.0;
        assert_abs_diff_eq!(percent_sum, 100.0, epsilon = 1e-3);
    }
}

#[test]
fn degenerate_hand_still_classifies() {
    // All landmarks coincident: the feature vector is all zeros, which has to
    // classify like any other input.
    let pinched = hand(Handedness::Left, |_| (0.5, 0.5));
    let detector = ScriptedDetector::new([Ok(vec![pinched])]);
    let bundle = varied_bundle(&["hello", "thanks"]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let classification = match pipeline.process(b"frame") {
        Outcome::Success { classification, .. } => classification,
        other => panic!("expected success, got {other:?}"),
    };
    assert!(classification.confidence > 0.0 && classification.confidence <= 100.0);
}

#[test]
fn outcomes_serialize_with_a_status_tag() {
    let detector = ScriptedDetector::new([
        Ok(Vec::new()),
        Ok(vec![hand(Handedness::Left, |i| (i as f32 / 21.0, 0.4))]),
    ]);
    let bundle = constant_score_bundle(&["hello", "thanks"], &[1.0, 0.0]);
    let mut pipeline = Pipeline::new(detector, classifier(&bundle));

    let empty = serde_json::to_value(pipeline.process(b"frame")).unwrap();
    assert_eq!(empty["status"], "no_hand_detected");

    let success = serde_json::to_value(pipeline.process(b"frame")).unwrap();
    assert_eq!(success["status"], "success");
    assert_eq!(success["classification"]["label"], "hello");
    assert_eq!(success["hands"].as_array().unwrap().len(), 1);
    let landmarks = success["hands"][0]["landmarks"].as_array().unwrap();
    assert_eq!(landmarks.len(), 21);
    assert!(landmarks[0].get("x").is_some() && landmarks[0].get("y").is_some());
}
