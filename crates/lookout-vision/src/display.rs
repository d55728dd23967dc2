use lookout_base::Tensor;
use std::fmt;

#[derive(Debug)]
pub enum DisplayError {
    /// The window is gone.
    Closed,
    Backend(String),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Closed => write!(f, "display closed"),
            DisplayError::Backend(msg) => write!(f, "display backend error: {msg}"),
        }
    }
}

impl std::error::Error for DisplayError {}

/// Where annotated frames go.
pub trait Display {
    /// Shows an HWC RGB frame.
    fn present(&mut self, frame: &Tensor<u8>) -> Result<(), DisplayError>;

    /// Whether the user asked to quit. Polled once per frame, after `present`.
    fn quit_requested(&mut self) -> bool;
}
