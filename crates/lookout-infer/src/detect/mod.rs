mod detector;
mod postprocess;
mod types;

pub use detector::{ObjectDetector, YoloDetector};
pub use postprocess::{iou, postprocess};
pub use types::{class_name, Detection, COCO_CLASS_NAMES};
