#![allow(dead_code)]

use lookout_base::Tensor;
use lookout_camera::{Camera, CameraError};
use lookout_infer::{
    Detection, Gesture, GestureClassifier, GestureLabel, HandLandmarker, HandLandmarks, Handedness,
    InferError, Landmark, ObjectDetector, HAND_LANDMARK_COUNT,
};
use lookout_vision::{Display, DisplayError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 48;

pub fn black_frame() -> Tensor<u8> {
    Tensor::zeros(vec![HEIGHT, WIDTH, 3]).unwrap()
}

/// Plays back a script of capture results, then reports `Exhausted`.
pub struct ScriptedCamera {
    script: VecDeque<Result<Tensor<u8>, CameraError>>,
    pub calls: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    pub fn frames(count: usize) -> (Self, Arc<AtomicUsize>) {
        Self::script((0..count).map(|_| Ok(black_frame())).collect())
    }

    pub fn script(script: Vec<Result<Tensor<u8>, CameraError>>) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let camera = Self {
            script: script.into(),
            calls: Arc::new(AtomicUsize::new(0)),
            drops: drops.clone(),
        };
        (camera, drops)
    }
}

impl Camera for ScriptedCamera {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or(Err(CameraError::Exhausted))
    }
}

impl Drop for ScriptedCamera {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Returns the same detections for every frame.
pub struct FixedDetector(pub Vec<Detection>);

impl ObjectDetector for FixedDetector {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<Vec<Detection>, InferError> {
        Ok(self.0.clone())
    }
}

/// Keeps a copy of every presented frame and asks to quit after `quit_after` frames.
pub struct RecordingDisplay {
    pub presented: Arc<Mutex<Vec<Tensor<u8>>>>,
    quit_after: Option<usize>,
    drops: Arc<AtomicUsize>,
}

pub struct DisplayLog {
    pub presented: Arc<Mutex<Vec<Tensor<u8>>>>,
    pub drops: Arc<AtomicUsize>,
}

impl RecordingDisplay {
    pub fn new(quit_after: Option<usize>) -> (Self, DisplayLog) {
        let presented = Arc::new(Mutex::new(Vec::new()));
        let drops = Arc::new(AtomicUsize::new(0));
        let display = Self {
            presented: presented.clone(),
            quit_after,
            drops: drops.clone(),
        };
        (display, DisplayLog { presented, drops })
    }
}

impl Display for RecordingDisplay {
    fn present(&mut self, frame: &Tensor<u8>) -> Result<(), DisplayError> {
        self.presented.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.quit_after
            .is_some_and(|k| self.presented.lock().unwrap().len() >= k)
    }
}

impl Drop for RecordingDisplay {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// A hand with every landmark at the same normalized point.
pub fn hand_at(x: f32, y: f32) -> HandLandmarks {
    HandLandmarks {
        points: [Landmark { x, y, z: 0.0 }; HAND_LANDMARK_COUNT],
        presence: 0.9,
        handedness: Handedness::Right,
    }
}

/// Finds one hand in the middle of every frame.
pub struct CenteredHand;

impl HandLandmarker for CenteredHand {
    fn landmarks(&mut self, _frame: &Tensor<u8>) -> Result<Vec<HandLandmarks>, InferError> {
        Ok(vec![hand_at(0.5, 0.5)])
    }
}

pub struct ThumbsUp;

impl GestureClassifier for ThumbsUp {
    fn classify(&mut self, _hand: &HandLandmarks) -> Result<Option<Gesture>, InferError> {
        Ok(Some(Gesture {
            label: GestureLabel::ThumbUp,
            score: 0.9,
        }))
    }
}

pub fn center_pixel(frame: &Tensor<u8>) -> [u8; 3] {
    let idx = ((HEIGHT / 2) * WIDTH + WIDTH / 2) * 3;
    [frame.data[idx], frame.data[idx + 1], frame.data[idx + 2]]
}
