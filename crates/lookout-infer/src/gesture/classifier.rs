use super::types::{Gesture, GestureLabel};
use crate::hand::{HandLandmarks, HAND_LANDMARK_COUNT};
use crate::{Backend, InferError, ModelSource, Session};
use lookout_base::Tensor;

/// Recognizes a gesture from one hand's landmarks.
pub trait GestureClassifier {
    /// `None` when no gesture scores high enough, or the best one is `GestureLabel::None`.
    fn classify(&mut self, hand: &HandLandmarks) -> Result<Option<Gesture>, InferError>;
}

/// Gesture classifier over a `[1, 63]` landmark input and a `[1, 8]` score output.
pub struct OnnxGestureClassifier {
    session: Box<dyn Session + Send>,
    min_score: f32,
}

impl OnnxGestureClassifier {
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        Ok(Self::from_session(backend.load_model(model)?))
    }

    pub fn from_session(session: Box<dyn Session + Send>) -> Self {
        Self {
            session,
            min_score: 0.5,
        }
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }
}

/// Landmarks relative to the wrist, scaled so the farthest landmark is 1.0 away in x/y.
///
/// This makes the input independent of where the hand is and how large it appears.
pub fn normalize_landmarks(hand: &HandLandmarks) -> Vec<f32> {
    let wrist = hand.points[0];
    let scale = hand
        .points
        .iter()
        .map(|p| ((p.x - wrist.x).powi(2) + (p.y - wrist.y).powi(2)).sqrt())
        .fold(0.0f32, f32::max);
    let scale = if scale > f32::EPSILON { scale } else { 1.0 };

    hand.points
        .iter()
        .flat_map(|p| {
            [
                (p.x - wrist.x) / scale,
                (p.y - wrist.y) / scale,
                (p.z - wrist.z) / scale,
            ]
        })
        .collect()
}

/// Softmax, unless `scores` already look like probabilities.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    if scores.iter().all(|&s| (0.0..=1.0).contains(&s)) && (sum - 1.0).abs() < 1e-3 {
        return scores.to_vec();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl GestureClassifier for OnnxGestureClassifier {
    fn classify(&mut self, hand: &HandLandmarks) -> Result<Option<Gesture>, InferError> {
        let input = Tensor::new(vec![1, HAND_LANDMARK_COUNT * 3], normalize_landmarks(hand))?;

        let input_name = self
            .session
            .input_names()
            .first()
            .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
            .clone();
        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let scores = match outputs.first() {
            Some((_, tensor)) if tensor.len() == GestureLabel::ALL.len() => softmax(&tensor.data),
            Some((name, tensor)) => {
                return Err(InferError::ShapeMismatch {
                    expected: format!("gesture output '{name}' with 8 scores"),
                    got: format!("{:?}", tensor.shape),
                });
            }
            None => return Err(InferError::BackendError("model produced no outputs".to_string())),
        };

        let best = scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(index, score)| GestureLabel::from_index(index).map(|label| Gesture { label, score }));

        Ok(best.filter(|g| g.label != GestureLabel::None && g.score >= self.min_score))
    }
}
