use lookout_image::ImageError;
use std::fmt;

#[derive(Debug)]
pub enum CameraError {
    /// The source has no more frames.
    Exhausted,
    /// One frame failed; the next read may succeed.
    Transient(String),
    /// The device could not be opened or configured, or it stopped working.
    Device(String),
    Stream(String),
    Decode(ImageError),
    Channel(String),
}

impl CameraError {
    /// Whether retrying the read can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CameraError::Transient(_) | CameraError::Decode(_))
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Exhausted => write!(f, "frame source exhausted"),
            CameraError::Transient(msg) => write!(f, "transient capture error: {msg}"),
            CameraError::Device(msg) => write!(f, "camera device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "camera stream error: {msg}"),
            CameraError::Decode(err) => write!(f, "frame decode error: {err}"),
            CameraError::Channel(msg) => write!(f, "camera channel error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CameraError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for CameraError {
    fn from(err: ImageError) -> Self {
        CameraError::Decode(err)
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::Device(err.to_string())
    }
}
