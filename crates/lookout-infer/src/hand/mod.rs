mod landmarker;
mod palm;
mod types;

pub use landmarker::{HandLandmarker, OnnxHandLandmarker};
pub use palm::{
    anchors, palm_anchor_layers, AnchorLayer, OnnxPalmDetector, PalmDetection, PalmDetector,
    PALM_KEYPOINT_COUNT,
};
pub use types::{Handedness, HandLandmark, HandLandmarks, Landmark, HAND_CONNECTIONS, HAND_LANDMARK_COUNT};
