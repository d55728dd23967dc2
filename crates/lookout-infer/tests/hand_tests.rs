mod common;

use common::CannedSession;
use lookout_base::{Rect, Tensor, Vec2};
use lookout_infer::hand::{anchors, palm_anchor_layers};
use lookout_infer::{
    Handedness, HandLandmark, HandLandmarker, HandLandmarks, InferError, Landmark, Layout,
    OnnxHandLandmarker, OnnxPalmDetector, PalmDetection, PalmDetector, HAND_CONNECTIONS,
};
use std::sync::{Arc, Mutex};

fn scalar(v: f32) -> Tensor<f32> {
    Tensor::new(vec![1, 1], vec![v]).unwrap()
}

/// Palm detector that reports the same palms for every frame.
struct FixedPalms(Vec<PalmDetection>);

impl PalmDetector for FixedPalms {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<PalmDetection>, InferError> {
        Ok(self.0.clone())
    }
}

/// Square palm of side `side` centered on `(x, y)`, with all keypoints at the center.
fn palm_at(x: f32, y: f32, side: f32, score: f32) -> PalmDetection {
    PalmDetection {
        bbox: Rect::new(Vec2::new(x - side / 2.0, y - side / 2.0), Vec2::new(side, side)),
        keypoints: [Vec2::new(x, y); 7],
        score,
    }
}

fn assert_near(got: Vec2<f32>, expected: Vec2<f32>) {
    assert!(
        (got.x - expected.x).abs() < 1e-3 && (got.y - expected.y).abs() < 1e-3,
        "{got:?} is not {expected:?}"
    );
}

fn landmark_outputs(presence: f32) -> Vec<(&'static str, Tensor<f32>)> {
    vec![
        ("Identity", screen_at(112.0, 112.0)),
        ("Identity_1", scalar(presence)),
        ("Identity_2", scalar(0.8)),
    ]
}

fn landmarker_with(
    palms: Vec<PalmDetection>,
    outputs: Vec<(&str, Tensor<f32>)>,
) -> (OnnxHandLandmarker, Arc<Mutex<Vec<Vec<usize>>>>) {
    let (session, seen) = CannedSession::boxed(outputs);
    (OnnxHandLandmarker::from_parts(Box::new(FixedPalms(palms)), session), seen)
}

/// Screen landmarks all placed at one input pixel.
fn screen_at(x: f32, y: f32) -> Tensor<f32> {
    let data = (0..21).flat_map(|_| [x, y, 0.0]).collect();
    Tensor::new(vec![1, 63], data).unwrap()
}

#[test]
fn test_connections_form_mediapipe_skeleton() {
    assert_eq!(HAND_CONNECTIONS.len(), 21);
    assert!(HAND_CONNECTIONS.contains(&(HandLandmark::Wrist, HandLandmark::ThumbCmc)));
    assert!(HAND_CONNECTIONS.contains(&(HandLandmark::PinkyDip, HandLandmark::PinkyTip)));
    // every landmark is part of the skeleton
    for index in 0..21 {
        assert!(HAND_CONNECTIONS
            .iter()
            .any(|(a, b)| *a as usize == index || *b as usize == index));
    }
}

#[test]
fn test_bounding_box() {
    let mut points = [Landmark { x: 0.5, y: 0.5, z: 0.0 }; 21];
    points[4] = Landmark { x: 0.2, y: 0.6, z: 0.0 };
    points[8] = Landmark { x: 0.7, y: 0.1, z: 0.0 };
    let hand = HandLandmarks {
        points,
        presence: 1.0,
        handedness: Handedness::Left,
    };
    let bbox = hand.bounding_box();
    assert_eq!((bbox.min().x, bbox.min().y), (0.2, 0.1));
    assert!((bbox.max().x - 0.7).abs() < 1e-6);
    assert!((bbox.max().y - 0.6).abs() < 1e-6);
    assert_eq!(hand.point(HandLandmark::IndexFingerTip).x, 0.7);
}

#[test]
fn test_each_palm_crop_gives_a_hand() {
    let palms = vec![palm_at(160.0, 240.0, 50.0, 0.9), palm_at(480.0, 240.0, 50.0, 0.8)];
    let (mut landmarker, seen) = landmarker_with(palms, landmark_outputs(0.9));
    assert_eq!(landmarker.max_num_hands(), 2);
    assert_eq!(landmarker.min_detection_confidence(), 0.5);

    let frame = Tensor::zeros(vec![480, 640, 3]).unwrap();
    let hands = landmarker.landmarks(&frame).unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![1, 224, 224, 3], vec![1, 224, 224, 3]]);
    assert_eq!(hands.len(), 2);
    // the center of each crop lands on its palm
    let wrists: Vec<_> = hands.iter().map(|hand| hand.point(HandLandmark::Wrist)).collect();
    assert!((wrists[0].x - 0.25).abs() < 1e-4, "x = {}", wrists[0].x);
    assert!((wrists[1].x - 0.75).abs() < 1e-4, "x = {}", wrists[1].x);
    for wrist in wrists {
        assert!((wrist.y - 0.5).abs() < 1e-4, "y = {}", wrist.y);
    }
    assert_eq!(hands[0].handedness, Handedness::Right);
    assert!((hands[0].presence - 0.9).abs() < 1e-6);
}

#[test]
fn test_no_palm_runs_no_landmarks() {
    let (mut landmarker, seen) = landmarker_with(Vec::new(), landmark_outputs(0.9));
    let frame = Tensor::zeros(vec![480, 640, 3]).unwrap();
    assert!(landmarker.landmarks(&frame).unwrap().is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_max_num_hands_keeps_best_palms() {
    let palms = vec![
        palm_at(100.0, 100.0, 40.0, 0.95),
        palm_at(300.0, 100.0, 40.0, 0.9),
        palm_at(500.0, 100.0, 40.0, 0.85),
    ];
    let frame = Tensor::zeros(vec![480, 640, 3]).unwrap();

    let (mut landmarker, seen) = landmarker_with(palms.clone(), landmark_outputs(0.9));
    assert_eq!(landmarker.landmarks(&frame).unwrap().len(), 2);
    assert_eq!(seen.lock().unwrap().len(), 2);

    let (landmarker, seen) = landmarker_with(palms, landmark_outputs(0.9));
    let mut landmarker = landmarker.with_max_num_hands(1);
    let hands = landmarker.landmarks(&frame).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(hands.len(), 1);
    assert!((hands[0].point(HandLandmark::Wrist).x - 100.0 / 640.0).abs() < 1e-4);
}

#[test]
fn test_absent_hand_yields_nothing() {
    let (mut landmarker, seen) = landmarker_with(vec![palm_at(16.0, 16.0, 8.0, 0.9)], landmark_outputs(0.2));
    let frame = Tensor::zeros(vec![32, 32, 3]).unwrap();
    assert!(landmarker.landmarks(&frame).unwrap().is_empty());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_nchw_layout_option() {
    let (landmarker, seen) = landmarker_with(vec![palm_at(16.0, 16.0, 8.0, 0.9)], landmark_outputs(0.0));
    let mut landmarker = landmarker.with_layout(Layout::Nchw).with_input_size(256);
    let frame = Tensor::zeros(vec![32, 32, 3]).unwrap();
    landmarker.landmarks(&frame).unwrap();
    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![1, 3, 256, 256]]);
}

#[test]
fn test_missing_outputs_are_errors() {
    let palm = || vec![palm_at(16.0, 16.0, 8.0, 0.9)];
    let frame = Tensor::zeros(vec![32, 32, 3]).unwrap();

    let (mut landmarker, _) = landmarker_with(palm(), vec![("Identity", screen_at(0.0, 0.0))]);
    assert!(matches!(landmarker.landmarks(&frame), Err(InferError::BackendError(_))));

    let wrong = Tensor::new(vec![1, 42], vec![0.0; 42]).unwrap();
    let (mut landmarker, _) =
        landmarker_with(palm(), vec![("Identity", wrong), ("p", scalar(1.0)), ("h", scalar(1.0))]);
    assert!(matches!(landmarker.landmarks(&frame), Err(InferError::ShapeMismatch { .. })));
}

#[test]
fn test_hand_roi_grows_palm_towards_fingers() {
    let mut palm = palm_at(96.0, 96.0, 40.0, 0.9);
    // wrist below the palm center, middle finger knuckle above it
    palm.keypoints[0] = Vec2::new(96.0, 116.0);
    palm.keypoints[2] = Vec2::new(96.0, 76.0);

    let roi = palm.hand_roi();
    assert_near(roi.size, Vec2::new(104.0, 104.0));
    assert_near(roi.origin, Vec2::new(44.0, 24.0));

    // no direction when the keypoints coincide
    let roi = palm_at(96.0, 96.0, 40.0, 0.9).hand_roi();
    assert_near(roi.origin, Vec2::new(44.0, 44.0));
}

const ANCHORS: usize = 2016;

/// Palm detector outputs with every anchor scored `-100` except those in `raised`.
fn palm_outputs(raised: &[(usize, f32, [f32; 18])]) -> Vec<(&'static str, Tensor<f32>)> {
    let mut regressors = vec![0.0; ANCHORS * 18];
    let mut scores = vec![-100.0; ANCHORS];
    for (index, score, raw) in raised {
        regressors[index * 18..(index + 1) * 18].copy_from_slice(raw);
        scores[*index] = *score;
    }
    vec![
        ("regressors", Tensor::new(vec![1, ANCHORS, 18], regressors).unwrap()),
        ("classificators", Tensor::new(vec![1, ANCHORS, 1], scores).unwrap()),
    ]
}

/// Regressor row for a 40 pixel palm, 92 pixels right of and below its anchor, with the wrist
/// 20 pixels below the center and the middle finger knuckle 20 above.
fn palm_row() -> [f32; 18] {
    let mut raw = [92.0; 18];
    raw[2] = 40.0;
    raw[3] = 40.0;
    raw[5] = 112.0;
    raw[9] = 72.0;
    raw
}

#[test]
fn test_palm_anchor_grid() {
    let anchors = anchors(&palm_anchor_layers(192));
    assert_eq!(anchors.len(), ANCHORS);
    assert_eq!(anchors[0], Vec2::new(0.5 / 24.0, 0.5 / 24.0));
    assert_eq!(anchors[1], anchors[0]);
    assert_eq!(anchors[2], Vec2::new(1.5 / 24.0, 0.5 / 24.0));
    // the stride 16 layer starts after 24 * 24 * 2 anchors
    assert_eq!(anchors[1152], Vec2::new(0.5 / 12.0, 0.5 / 12.0));
    assert_eq!(anchors[ANCHORS - 1], Vec2::new(11.5 / 12.0, 11.5 / 12.0));
}

#[test]
fn test_palms_are_decoded_and_suppressed() {
    let mut far = [0.0; 18];
    far[2] = 20.0;
    far[3] = 20.0;
    let (session, seen) = CannedSession::boxed(palm_outputs(&[
        (0, 10.0, palm_row()),
        // same cell, same box: suppressed
        (1, 5.0, palm_row()),
        (ANCHORS - 1, 3.0, far),
    ]));
    let mut detector = OnnxPalmDetector::from_session(session);
    assert_eq!(detector.anchor_count(), ANCHORS);
    assert_eq!(detector.min_score(), 0.5);
    assert_eq!(detector.iou_threshold(), 0.3);

    let frame = Tensor::zeros(vec![192, 192, 3]).unwrap();
    let palms = detector.detect(&frame).unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), &[vec![1, 192, 192, 3]]);
    assert_eq!(palms.len(), 2);
    let palm = &palms[0];
    assert!(palm.score > 0.99);
    assert_near(palm.bbox.origin, Vec2::new(76.0, 76.0));
    assert_near(palm.bbox.size, Vec2::new(40.0, 40.0));
    assert_near(palm.keypoints[0], Vec2::new(96.0, 116.0));
    assert_near(palm.keypoints[2], Vec2::new(96.0, 76.0));

    let far = &palms[1];
    assert!(far.score < palm.score);
    assert_near(far.bbox.origin, Vec2::new(174.0, 174.0));
    assert_near(far.bbox.size, Vec2::new(20.0, 20.0));
}

#[test]
fn test_palms_are_mapped_through_letterbox() {
    // a 640x480 frame in a 192 input: scale 0.3, pad_y 24
    let (session, _) = CannedSession::boxed(palm_outputs(&[(0, 10.0, palm_row())]));
    let mut detector = OnnxPalmDetector::from_session(session);
    let frame = Tensor::zeros(vec![480, 640, 3]).unwrap();
    let palms = detector.detect(&frame).unwrap();

    assert_eq!(palms.len(), 1);
    assert_near(palms[0].bbox.origin + palms[0].bbox.size * 0.5, Vec2::new(320.0, 240.0));
    assert!((palms[0].bbox.size.x - 40.0 / 0.3).abs() < 1e-2);
}

#[test]
fn test_low_scores_yield_no_palms() {
    let (session, _) = CannedSession::boxed(palm_outputs(&[(0, -1.0, palm_row())]));
    let mut detector = OnnxPalmDetector::from_session(session);
    let frame = Tensor::zeros(vec![192, 192, 3]).unwrap();
    assert!(detector.detect(&frame).unwrap().is_empty());
}

#[test]
fn test_palm_outputs_are_checked() {
    let frame = Tensor::zeros(vec![192, 192, 3]).unwrap();

    let mut outputs = palm_outputs(&[]);
    outputs.truncate(1);
    let (session, _) = CannedSession::boxed(outputs);
    let mut detector = OnnxPalmDetector::from_session(session);
    assert!(matches!(detector.detect(&frame), Err(InferError::BackendError(_))));

    let short = Tensor::new(vec![1, 896, 18], vec![0.0; 896 * 18]).unwrap();
    let (session, _) = CannedSession::boxed(vec![("regressors", short), ("classificators", scalar(0.0))]);
    let mut detector = OnnxPalmDetector::from_session(session);
    assert!(matches!(detector.detect(&frame), Err(InferError::ShapeMismatch { .. })));
}
