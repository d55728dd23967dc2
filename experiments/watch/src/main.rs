mod window;

use lookout_base::log;
use lookout_camera::{Camera, CameraConfig, ImageSequence, PixelFormat, V4l2Camera};
use lookout_infer::{
    Backend, Device, ModelSource, OnnxBackend, OnnxGestureClassifier, OnnxHandLandmarker, YoloDetector,
};
use lookout_vision::{GestureMode, GestureWorker, HandStage, Pipeline, PipelineConfig};
use std::env;
use std::path::{Path, PathBuf};
use window::MinifbDisplay;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

const DEFAULT_CAMERA: &str = "/dev/video0";
const DEFAULT_DETECTOR_MODEL: &str = "models/yolo11m.onnx";
const DEFAULT_PALM_MODEL: &str = "models/palm_detection_lite.onnx";
const DEFAULT_HAND_MODEL: &str = "models/hand_landmark_lite.onnx";
const DEFAULT_GESTURE_MODEL: &str = "models/gesture_classifier.onnx";

#[derive(Debug, PartialEq)]
enum Source {
    /// A directory of still images, replayed in name order.
    Replay(PathBuf),
    Device(String),
}

fn source_from(value: Option<String>) -> Source {
    match value {
        Some(value) if Path::new(&value).is_dir() => Source::Replay(value.into()),
        Some(value) => Source::Device(value),
        None => Source::Device(DEFAULT_CAMERA.to_string()),
    }
}

fn model_path(key: &str, default: &str) -> PathBuf {
    env::var(key).unwrap_or_else(|_| default.to_string()).into()
}

fn hand_stage(mode: GestureMode, backend: &dyn Backend) -> Result<HandStage, Box<dyn std::error::Error>> {
    let landmarker = || {
        let palm_model = model_path("LOOKOUT_PALM_MODEL", DEFAULT_PALM_MODEL);
        let hand_model = model_path("LOOKOUT_HAND_MODEL", DEFAULT_HAND_MODEL);
        log::info!("loading hand models {} and {}", palm_model.display(), hand_model.display());
        OnnxHandLandmarker::new(ModelSource::File(palm_model), ModelSource::File(hand_model), backend)
    };
    Ok(match mode {
        GestureMode::Off => HandStage::Off,
        GestureMode::Sync => HandStage::Sync(Box::new(landmarker()?)),
        GestureMode::Live => {
            let landmarker = landmarker()?;
            let gesture_model = model_path("LOOKOUT_GESTURE_MODEL", DEFAULT_GESTURE_MODEL);
            let classifier = OnnxGestureClassifier::new(ModelSource::File(gesture_model), backend)?;
            HandStage::Live(GestureWorker::spawn(landmarker, classifier))
        }
    })
}

async fn watch<C: Camera>(camera: C, config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = OnnxBackend::new(Device::Cpu);

    let detector_model = model_path("LOOKOUT_DETECTOR_MODEL", DEFAULT_DETECTOR_MODEL);
    log::info!("loading detector {}", detector_model.display());
    let detector = YoloDetector::new(ModelSource::File(detector_model), &backend)?;

    let hands = hand_stage(config.gesture_mode, &backend)?;
    let display = MinifbDisplay::new(config.window_title.clone());

    let summary = Pipeline::new(camera, detector, display, hands, config).run().await?;
    log::info!(
        "{} frames, {} boxes, {} gesture results, exit {:?}",
        summary.frames,
        summary.detections_drawn,
        summary.gesture_results,
        summary.exit
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match env::var("LOOKOUT_LOG_DIR") {
        Ok(dir) => lookout_base::init_file_logger(dir)?,
        Err(_) => lookout_base::init_stdout_logger(),
    }

    let config = PipelineConfig::from_env()?;
    log::info!("watch: {config:?}");

    let result = match source_from(env::var("LOOKOUT_CAMERA").ok()) {
        Source::Replay(dir) => {
            log::info!("replaying images from {}", dir.display());
            watch(ImageSequence::from_dir(&dir)?, config).await
        }
        Source::Device(device) => {
            let camera_config = CameraConfig::default()
                .with_device(device.as_str())
                .with_width(WIDTH)
                .with_height(HEIGHT)
                .with_format(PixelFormat::Mjpeg);
            log::info!("opening {device}");
            watch(V4l2Camera::new(camera_config)?, config).await
        }
    };

    if let Err(e) = &result {
        log::error!("watch failed: {e}");
    }
    result
}
