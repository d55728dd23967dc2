use super::postprocess::postprocess;
use super::types::Detection;
use crate::letterbox::{letterbox, Layout};
use crate::{Backend, InferError, ModelSource, Session};
use lookout_base::Tensor;

const INPUT_SIZE: usize = 640;
const PAD_COLOR: f32 = 114.0 / 255.0;

/// Finds objects in a frame.
pub trait ObjectDetector {
    /// Detects objects in an HWC RGB frame. Boxes are in that frame's pixel coordinates.
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<Detection>, InferError>;
}

/// YOLOv8/YOLO11 detector over an ONNX export with a `[1, 4 + C, N]` output.
///
/// Handles letterbox resize, model inference, confidence filtering, coordinate rescaling and
/// NMS. No class filtering happens here.
pub struct YoloDetector {
    session: Box<dyn Session + Send>,
    conf_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
}

impl YoloDetector {
    /// Loads the model with defaults conf=0.25, iou=0.7, max 300 detections.
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        Ok(Self::from_session(backend.load_model(model)?))
    }

    pub fn from_session(session: Box<dyn Session + Send>) -> Self {
        Self {
            session,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_max_detections(mut self, max_detections: usize) -> Self {
        self.max_detections = max_detections;
        self
    }

    pub fn conf_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<Detection>, InferError> {
        let (input, info) = letterbox(frame, INPUT_SIZE, PAD_COLOR, Layout::Nchw)?;
        let (height, width, _) = frame.hwc().unwrap_or_default();

        let input_name = self
            .session
            .input_names()
            .first()
            .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
            .clone();

        let outputs = self.session.run(&[(input_name.as_str(), input)])?;
        let (_, output) = outputs
            .first()
            .ok_or_else(|| InferError::BackendError("model produced no outputs".to_string()))?;

        postprocess(
            output,
            &info,
            width,
            height,
            self.conf_threshold,
            self.iou_threshold,
            self.max_detections,
        )
    }
}
