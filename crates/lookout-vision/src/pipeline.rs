use crate::renderer::{draw_detections, draw_gesture, draw_hand};
use crate::{Display, GestureResult, GestureWorker, PipelineConfig, PipelineError};
use lookout_base::Tensor;
use lookout_camera::{Camera, CameraError, RetryingCamera};
use lookout_image::RgbCanvas;
use lookout_infer::{HandLandmarker, HandLandmarks, ObjectDetector};

/// What happens with hands on each frame.
pub enum HandStage {
    Off,
    /// Landmarks on the current frame, drawn before it is shown.
    Sync(Box<dyn HandLandmarker + Send>),
    /// Landmarks and gestures from the worker, drawn on a later frame while still fresh.
    Live(GestureWorker),
}

impl std::fmt::Debug for HandStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandStage::Off => write!(f, "Off"),
            HandStage::Sync(_) => write!(f, "Sync"),
            HandStage::Live(worker) => f.debug_tuple("Live").field(worker).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The camera ran out of frames.
    EndOfStream,
    /// The user asked to quit.
    Quit,
    /// `max_frames` frames were shown.
    FrameLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames presented.
    pub frames: u64,
    pub detections_drawn: u64,
    /// Results received from the gesture worker.
    pub gesture_results: u64,
    pub exit: ExitReason,
}

/// The capture, annotate, display loop.
///
/// The pipeline owns its camera and display; both are dropped when [`run`](Self::run) returns.
pub struct Pipeline<C, D, P> {
    camera: RetryingCamera<C>,
    detector: D,
    display: P,
    hands: HandStage,
    config: PipelineConfig,
}

impl<C, D, P> Pipeline<C, D, P>
where
    C: Camera,
    D: ObjectDetector,
    P: Display,
{
    pub fn new(camera: C, detector: D, display: P, hands: HandStage, config: PipelineConfig) -> Self {
        Self {
            camera: RetryingCamera::new(camera, config.retry.clone()),
            detector,
            display,
            hands,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(mut self) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary {
            frames: 0,
            detections_drawn: 0,
            gesture_results: 0,
            exit: ExitReason::EndOfStream,
        };
        let mut latest: Option<GestureResult> = None;

        log::info!("pipeline starting, hand stage {:?}", self.hands);

        if self.config.max_frames == Some(0) {
            summary.exit = ExitReason::FrameLimit;
            return Ok(summary);
        }

        loop {
            let mut frame = match self.camera.recv().await {
                Ok(frame) => frame,
                Err(CameraError::Exhausted) => {
                    summary.exit = ExitReason::EndOfStream;
                    break;
                }
                Err(e) => {
                    log::error!("capture failed after {} frames: {e}", summary.frames);
                    return Err(e.into());
                }
            };
            let seq = summary.frames + 1;

            // everything that looks at the image runs before anything is drawn on it
            let inline_hands = match &mut self.hands {
                HandStage::Off => Vec::new(),
                HandStage::Sync(landmarker) => landmarker.landmarks(&frame)?,
                HandStage::Live(worker) => {
                    // drain first so a result never lands on the frame it was computed from
                    if let Some(result) = worker.drain() {
                        summary.gesture_results += 1;
                        latest = Some(result);
                    }
                    worker.submit(seq, &frame);
                    Vec::new()
                }
            };
            let detections = self.detector.detect(&frame)?;

            let fresh = latest
                .as_ref()
                .filter(|result| result.is_fresh(seq, self.config.stale_after_frames));
            summary.detections_drawn +=
                annotate(&mut frame, &detections, &inline_hands, fresh, &self.config)? as u64;

            self.display.present(&frame)?;
            summary.frames = seq;

            if self.display.quit_requested() {
                summary.exit = ExitReason::Quit;
                break;
            }
            if self.config.max_frames.is_some_and(|max| summary.frames >= max) {
                summary.exit = ExitReason::FrameLimit;
                break;
            }
        }

        log::info!(
            "pipeline stopped ({:?}) after {} frames",
            summary.exit,
            summary.frames
        );
        Ok(summary)
    }
}

fn annotate(
    frame: &mut Tensor<u8>,
    detections: &[lookout_infer::Detection],
    hands: &[HandLandmarks],
    gestures: Option<&GestureResult>,
    config: &PipelineConfig,
) -> Result<usize, PipelineError> {
    let shape = frame.shape.clone();
    let Some(mut canvas) = RgbCanvas::from_frame(frame) else {
        return Err(CameraError::Stream(format!("expected a [height, width, 3] frame, got {shape:?}")).into());
    };

    let drawn = draw_detections(&mut canvas, detections, &config.detection);
    for hand in hands {
        draw_hand(&mut canvas, hand);
    }
    if let Some(result) = gestures {
        for (hand, gesture) in &result.hands {
            draw_hand(&mut canvas, hand);
            if let Some(gesture) = gesture {
                draw_gesture(&mut canvas, hand, gesture);
            }
        }
    }
    Ok(drawn)
}
