use lookout_base::{Rect, Vec2};

/// The 80 COCO class names, indexed by model class id.
pub const COCO_CLASS_NAMES: [&str; 80] = [
    "person", "bicycle", "car", "motorbike", "aeroplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "sofa",
    "pottedplant", "bed", "diningtable", "toilet", "tvmonitor", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

pub fn class_name(class_id: usize) -> Option<&'static str> {
    COCO_CLASS_NAMES.get(class_id).copied()
}

/// A detected object in pixel coordinates of the frame it was detected in.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: Rect<f32>,
    pub class_id: usize,
    pub confidence: f32,
}

impl Detection {
    /// Builds a detection from corner coordinates.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32, class_id: usize, confidence: f32) -> Self {
        Self {
            bbox: Rect::from_min_max(Vec2::new(x1, y1), Vec2::new(x2, y2)),
            class_id,
            confidence,
        }
    }

    pub fn x1(&self) -> f32 {
        self.bbox.origin.x
    }

    pub fn y1(&self) -> f32 {
        self.bbox.origin.y
    }

    pub fn x2(&self) -> f32 {
        self.bbox.max().x
    }

    pub fn y2(&self) -> f32 {
        self.bbox.max().y
    }

    pub fn class_name(&self) -> Option<&'static str> {
        class_name(self.class_id)
    }
}
