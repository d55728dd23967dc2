//! Frame sources for lookout.
//!
//! Every source implements the pull-based [`Camera`] trait and yields HWC RGB frames. Sources
//! end with [`CameraError::Exhausted`]; wrap one in [`RetryingCamera`] to ride out transient
//! failures.

pub mod config;
pub mod error;
pub mod retry;
pub mod sequence;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::{CameraConfig, PixelFormat};
pub use error::CameraError;
pub use retry::{RetryPolicy, RetryingCamera};
pub use sequence::ImageSequence;
pub use traits::Camera;

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Camera;
