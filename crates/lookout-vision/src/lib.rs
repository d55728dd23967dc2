//! The lookout frame loop.
//!
//! [`Pipeline`] pulls frames from a camera, draws the selected detections, runs the hand stage
//! (inline landmarks, or landmarks plus gestures on a [`GestureWorker`]) and shows the result
//! on a [`Display`] until the user quits or the source runs dry.

pub mod config;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod worker;

pub use config::{DetectionConfig, GestureMode, PipelineConfig};
pub use display::{Display, DisplayError};
pub use error::PipelineError;
pub use pipeline::{ExitReason, HandStage, Pipeline, RunSummary};
pub use renderer::{draw_detections, draw_gesture, draw_hand, round_up_confidence};
pub use worker::{GestureResult, GestureWorker, Timestamps};
