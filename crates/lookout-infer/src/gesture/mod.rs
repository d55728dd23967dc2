mod classifier;
mod types;

pub use classifier::{normalize_landmarks, softmax, GestureClassifier, OnnxGestureClassifier};
pub use types::{Gesture, GestureLabel};
