use crate::DisplayError;
use lookout_camera::CameraError;
use lookout_infer::InferError;
use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    Camera(CameraError),
    Infer(InferError),
    Display(DisplayError),
    Config(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Camera(err) => write!(f, "camera: {err}"),
            PipelineError::Infer(err) => write!(f, "inference: {err}"),
            PipelineError::Display(err) => write!(f, "display: {err}"),
            PipelineError::Config(msg) => write!(f, "configuration: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Camera(err) => Some(err),
            PipelineError::Infer(err) => Some(err),
            PipelineError::Display(err) => Some(err),
            PipelineError::Config(_) => None,
        }
    }
}

impl From<CameraError> for PipelineError {
    fn from(err: CameraError) -> Self {
        PipelineError::Camera(err)
    }
}

impl From<InferError> for PipelineError {
    fn from(err: InferError) -> Self {
        PipelineError::Infer(err)
    }
}

impl From<DisplayError> for PipelineError {
    fn from(err: DisplayError) -> Self {
        PipelineError::Display(err)
    }
}
