use crate::detect::iou;
use crate::letterbox::{letterbox, Layout};
use crate::{Backend, InferError, ModelSource, Session};
use lookout_base::{Rect, Tensor, Vec2};

pub const PALM_KEYPOINT_COUNT: usize = 7;

const VALUES_PER_ANCHOR: usize = 4 + 2 * PALM_KEYPOINT_COUNT;
const SCORE_CLIP: f32 = 100.0;

/// Palm box side to hand crop side.
const HAND_ROI_SCALE: f32 = 2.6;
/// Hand crop shift towards the fingers, in palm heights.
const HAND_ROI_SHIFT: f32 = 0.5;

/// One SSD output layer: a `width`x`height` grid of cells with `boxes_per_cell` anchors each.
#[derive(Debug, Clone, Copy)]
pub struct AnchorLayer {
    pub boxes_per_cell: usize,
    pub width: usize,
    pub height: usize,
}

/// Anchor centers in [0, 1], layer by layer, row-major, `boxes_per_cell` copies per cell.
pub fn anchors(layers: &[AnchorLayer]) -> Vec<Vec2<f32>> {
    let mut anchors = Vec::new();
    for layer in layers {
        for y in 0..layer.height {
            for x in 0..layer.width {
                let center = Vec2::new(
                    (x as f32 + 0.5) / layer.width as f32,
                    (y as f32 + 0.5) / layer.height as f32,
                );
                anchors.extend(std::iter::repeat_n(center, layer.boxes_per_cell));
            }
        }
    }
    anchors
}

/// Layers of MediaPipe's palm detector for a square input of `input_size` pixels: strides 8
/// and 16 with 2 and 6 anchors per cell. 2016 anchors for the 192 pixel lite model.
pub fn palm_anchor_layers(input_size: usize) -> [AnchorLayer; 2] {
    let grid = |stride: usize| input_size.div_ceil(stride);
    [
        AnchorLayer {
            boxes_per_cell: 2,
            width: grid(8),
            height: grid(8),
        },
        AnchorLayer {
            boxes_per_cell: 6,
            width: grid(16),
            height: grid(16),
        },
    ]
}

/// A detected palm, in frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDetection {
    pub bbox: Rect<f32>,
    /// Wrist, index, middle and ring finger MCPs, pinky MCP, thumb CMC and thumb MCP.
    pub keypoints: [Vec2<f32>; PALM_KEYPOINT_COUNT],
    pub score: f32,
}

impl PalmDetection {
    /// Square crop around the whole hand that the landmark model is run on.
    ///
    /// The palm box is grown to 2.6 times its longer side and moved half a palm height from
    /// the wrist towards the middle finger. The crop is not rotated.
    pub fn hand_roi(&self) -> Rect<f32> {
        let center = self.bbox.origin + self.bbox.size * 0.5;
        let towards_fingers = self.keypoints[2] - self.keypoints[0];
        let length = (towards_fingers.x * towards_fingers.x
            + towards_fingers.y * towards_fingers.y)
            .sqrt();
        let center = if length > f32::EPSILON {
            center + towards_fingers * (HAND_ROI_SHIFT * self.bbox.size.y / length)
        } else {
            center
        };

        let side = self.bbox.size.x.max(self.bbox.size.y) * HAND_ROI_SCALE;
        Rect::new(center - Vec2::new(side, side) * 0.5, Vec2::new(side, side))
    }
}

/// Finds palms in a frame.
pub trait PalmDetector {
    /// Detections sorted by score, descending.
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<PalmDetection>, InferError>;
}

/// MediaPipe palm detection model (lite or full) exported to ONNX.
///
/// Expected outputs, in order: `[1, N, 18]` box and keypoint regressors in input pixels
/// relative to their anchor, and `[1, N, 1]` raw scores, with one row per anchor.
pub struct OnnxPalmDetector {
    session: Box<dyn Session + Send>,
    input_size: usize,
    layout: Layout,
    anchors: Vec<Vec2<f32>>,
    min_score: f32,
    iou_threshold: f32,
}

impl OnnxPalmDetector {
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        Ok(Self::from_session(backend.load_model(model)?))
    }

    /// Defaults: 192x192 NHWC input, `min_score` 0.5, `iou_threshold` 0.3.
    pub fn from_session(session: Box<dyn Session + Send>) -> Self {
        Self {
            session,
            input_size: 192,
            layout: Layout::Nhwc,
            anchors: anchors(&palm_anchor_layers(192)),
            min_score: 0.5,
            iou_threshold: 0.3,
        }
    }

    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size;
        self.anchors = anchors(&palm_anchor_layers(input_size));
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x.clamp(-SCORE_CLIP, SCORE_CLIP)).exp())
}

fn output<'a>(
    outputs: &'a [(String, Tensor<f32>)],
    index: usize,
    what: &str,
    len: usize,
) -> Result<&'a Tensor<f32>, InferError> {
    match outputs.get(index) {
        Some((_, tensor)) if tensor.len() == len => Ok(tensor),
        Some((name, tensor)) => Err(InferError::ShapeMismatch {
            expected: format!("{what} output '{name}' with {len} values"),
            got: format!("{:?}", tensor.shape),
        }),
        None => Err(InferError::BackendError(format!("model has no {what} output"))),
    }
}

impl PalmDetector for OnnxPalmDetector {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<PalmDetection>, InferError> {
        let (input, info) = letterbox(frame, self.input_size, 0.0, self.layout)?;

        let input_name = self
            .session
            .input_names()
            .first()
            .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
            .clone();
        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let count = self.anchors.len();
        let regressors = output(&outputs, 0, "regressor", count * VALUES_PER_ANCHOR)?;
        let scores = output(&outputs, 1, "score", count)?;

        let size = self.input_size as f32;
        let to_frame = |anchor: Vec2<f32>, dx: f32, dy: f32| {
            let (x, y) = info.to_source(anchor.x * size + dx, anchor.y * size + dy);
            Vec2::new(x, y)
        };

        let mut candidates = Vec::new();
        for (index, (&anchor, raw)) in self
            .anchors
            .iter()
            .zip(regressors.data.chunks_exact(VALUES_PER_ANCHOR))
            .enumerate()
        {
            let score = sigmoid(scores.data[index]);
            if score < self.min_score {
                continue;
            }

            let center = to_frame(anchor, raw[0], raw[1]);
            let box_size = Vec2::new(raw[2], raw[3]) / info.scale;
            let mut keypoints = [Vec2::zero(); PALM_KEYPOINT_COUNT];
            for (k, point) in keypoints.iter_mut().enumerate() {
                *point = to_frame(anchor, raw[4 + 2 * k], raw[5 + 2 * k]);
            }

            candidates.push(PalmDetection {
                bbox: Rect::new(center - box_size * 0.5, box_size),
                keypoints,
                score,
            });
        }

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut kept: Vec<PalmDetection> = Vec::new();
        for candidate in candidates {
            if kept
                .iter()
                .all(|palm| iou(&palm.bbox, &candidate.bbox) <= self.iou_threshold)
            {
                kept.push(candidate);
            }
        }
        log::trace!("{} palms", kept.len());
        Ok(kept)
    }
}
