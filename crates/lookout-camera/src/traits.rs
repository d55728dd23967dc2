use crate::CameraError;
use lookout_base::Tensor;

/// Async camera trait for frame capture.
///
/// `recv` returns decoded frames as `Tensor<u8>` in HWC layout `[height, width, 3]`, RGB.
/// A source that has run out of frames returns [`CameraError::Exhausted`].
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Receive the next frame from the camera.
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError>;
}
