use crate::Device;
use std::fmt;

#[derive(Debug)]
pub enum InferError {
    ModelLoad(String),
    BackendError(String),
    InvalidInput {
        name: String,
        expected_names: Vec<String>,
    },
    ShapeMismatch {
        expected: String,
        got: String,
    },
    UnsupportedDevice(Device),
    UnsupportedDtype(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::BackendError(msg) => write!(f, "backend error: {msg}"),
            InferError::InvalidInput {
                name,
                expected_names,
            } => write!(f, "invalid input '{name}', model expects {expected_names:?}"),
            InferError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected}, got {got}")
            }
            InferError::UnsupportedDevice(device) => write!(f, "unsupported device: {device}"),
            InferError::UnsupportedDtype(msg) => write!(f, "unsupported dtype: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<lookout_base::TensorError> for InferError {
    fn from(err: lookout_base::TensorError) -> Self {
        InferError::BackendError(format!("failed to create tensor: {err}"))
    }
}
