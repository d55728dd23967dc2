//! Model runtime seam and the model adapters lookout runs per frame.
//!
//! [`Backend`] loads a model into a [`Session`]; [`OnnxBackend`] does so with ONNX Runtime.
//! The adapters turn frames into model inputs and model outputs into typed results:
//! [`YoloDetector`] for objects, [`OnnxPalmDetector`] and [`OnnxHandLandmarker`] for hand
//! landmarks and [`OnnxGestureClassifier`] for gestures. Each sits behind a trait so the frame
//! loop can be driven by other implementations.

pub mod backend;
pub mod detect;
pub mod device;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod letterbox;
pub mod modelsource;
pub mod onnx;
pub mod session;

pub use backend::Backend;
pub use detect::{
    class_name, iou, postprocess, Detection, ObjectDetector, YoloDetector, COCO_CLASS_NAMES,
};
pub use device::Device;
pub use error::InferError;
pub use gesture::{Gesture, GestureClassifier, GestureLabel, OnnxGestureClassifier};
pub use hand::{
    AnchorLayer, Handedness, HandLandmark, HandLandmarker, HandLandmarks, Landmark,
    OnnxHandLandmarker, OnnxPalmDetector, PalmDetection, PalmDetector, HAND_CONNECTIONS,
    HAND_LANDMARK_COUNT,
};
pub use letterbox::{crop_square, letterbox, Layout, LetterboxInfo};
pub use modelsource::ModelSource;
pub use onnx::OnnxBackend;
pub use session::Session;
