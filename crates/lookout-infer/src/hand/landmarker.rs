use super::palm::{OnnxPalmDetector, PalmDetector};
use super::types::{Handedness, HandLandmarks, Landmark, HAND_LANDMARK_COUNT};
use crate::letterbox::{crop_square, Layout};
use crate::{Backend, InferError, ModelSource, Session};
use lookout_base::{Rect, Tensor};

/// Finds hands in a frame and regresses their 21 landmarks.
pub trait HandLandmarker {
    fn landmarks(&mut self, frame: &Tensor<u8>) -> Result<Vec<HandLandmarks>, InferError>;
}

/// MediaPipe hand landmark model (lite or full) exported to ONNX, run on palm crops.
///
/// A [`PalmDetector`] finds palms first. The landmark model then runs once per palm, on the
/// square [`hand_roi`](PalmDetection::hand_roi) crop, for at most `max_num_hands` palms in
/// score order. Expected landmark outputs, in order: `[1, 63]` screen landmarks in crop
/// pixels, `[1, 1]` presence, `[1, 1]` handedness. Further outputs (world landmarks) are
/// ignored.
pub struct OnnxHandLandmarker {
    palms: Box<dyn PalmDetector + Send>,
    session: Box<dyn Session + Send>,
    input_size: usize,
    layout: Layout,
    min_detection_confidence: f32,
    max_num_hands: usize,
}

impl OnnxHandLandmarker {
    pub fn new(
        palm_model: ModelSource,
        landmark_model: ModelSource,
        backend: &dyn Backend,
    ) -> Result<Self, InferError> {
        let palms = OnnxPalmDetector::new(palm_model, backend)?;
        Ok(Self::from_parts(Box::new(palms), backend.load_model(landmark_model)?))
    }

    /// Defaults: 224x224 NHWC crops, `min_detection_confidence` 0.5, `max_num_hands` 2.
    pub fn from_parts(palms: Box<dyn PalmDetector + Send>, session: Box<dyn Session + Send>) -> Self {
        Self {
            palms,
            session,
            input_size: 224,
            layout: Layout::Nhwc,
            min_detection_confidence: 0.5,
            max_num_hands: 2,
        }
    }

    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_min_detection_confidence(mut self, confidence: f32) -> Self {
        self.min_detection_confidence = confidence;
        self
    }

    pub fn with_max_num_hands(mut self, max_num_hands: usize) -> Self {
        self.max_num_hands = max_num_hands;
        self
    }

    pub fn min_detection_confidence(&self) -> f32 {
        self.min_detection_confidence
    }

    pub fn max_num_hands(&self) -> usize {
        self.max_num_hands
    }

    fn landmarks_in(
        &mut self,
        frame: &Tensor<u8>,
        roi: &Rect<f32>,
    ) -> Result<Option<HandLandmarks>, InferError> {
        let input = crop_square(frame, roi, self.input_size, self.layout)?;
        let (height, width, _) = frame.hwc().unwrap_or_default();

        let input_name = self
            .session
            .input_names()
            .first()
            .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
            .clone();
        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let screen = match outputs.first() {
            Some((_, tensor)) if tensor.len() == HAND_LANDMARK_COUNT * 3 => tensor,
            Some((name, tensor)) => {
                return Err(InferError::ShapeMismatch {
                    expected: format!("landmark output '{name}' with 63 values"),
                    got: format!("{:?}", tensor.shape),
                });
            }
            None => return Err(InferError::BackendError("model produced no outputs".to_string())),
        };
        let presence = scalar(&outputs, 1, "presence")?;
        let handedness = scalar(&outputs, 2, "handedness")?;

        if presence < self.min_detection_confidence {
            return Ok(None);
        }

        // crop pixels to frame pixels
        let scale = roi.size.x / self.input_size as f32;
        let mut points = [Landmark::default(); HAND_LANDMARK_COUNT];
        for (point, xyz) in points.iter_mut().zip(screen.data.chunks_exact(3)) {
            *point = Landmark {
                x: (roi.origin.x + xyz[0] * scale) / width as f32,
                y: (roi.origin.y + xyz[1] * scale) / height as f32,
                z: xyz[2] * scale / width as f32,
            };
        }

        Ok(Some(HandLandmarks {
            points,
            presence,
            handedness: if handedness > 0.5 {
                Handedness::Right
            } else {
                Handedness::Left
            },
        }))
    }
}

fn scalar(outputs: &[(String, Tensor<f32>)], index: usize, what: &str) -> Result<f32, InferError> {
    match outputs.get(index) {
        Some((_, tensor)) if tensor.len() == 1 => Ok(tensor.data[0]),
        Some((name, tensor)) => Err(InferError::ShapeMismatch {
            expected: format!("{what} output '{name}' of shape [1, 1]"),
            got: format!("{:?}", tensor.shape),
        }),
        None => Err(InferError::BackendError(format!("model has no {what} output"))),
    }
}

impl HandLandmarker for OnnxHandLandmarker {
    fn landmarks(&mut self, frame: &Tensor<u8>) -> Result<Vec<HandLandmarks>, InferError> {
        let palms = self.palms.detect(frame)?;
        let mut hands = Vec::new();
        for palm in palms.iter().take(self.max_num_hands) {
            if let Some(hand) = self.landmarks_in(frame, &palm.hand_roi())? {
                hands.push(hand);
            }
        }
        Ok(hands)
    }
}
