use crate::{Camera, CameraConfig, CameraError, PixelFormat};
use lookout_base::Tensor;
use lookout_image::{decode_image, yuyv_to_rgb};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

type FrameResult = Result<Tensor<u8>, CameraError>;

/// V4L2 camera capturing on a background thread.
///
/// Frames are decoded on the capture thread and handed over through a bounded channel of
/// `buffer_count` frames.
pub struct V4l2Camera {
    config: CameraConfig,
    format: Negotiated,
    device: Option<Device>,
    receiver: Option<mpsc::Receiver<FrameResult>>,
    thread_handle: Option<JoinHandle<()>>,
}

/// Format the device actually accepted.
#[derive(Debug, Clone, Copy)]
enum Negotiated {
    Mjpeg,
    Yuyv { width: u32, height: u32 },
}

impl std::fmt::Debug for V4l2Camera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Camera")
            .field("config", &self.config)
            .field("format", &self.format)
            .field("receiver", &self.receiver.is_some())
            .field("thread_handle", &self.thread_handle.is_some())
            .finish()
    }
}

impl Camera for V4l2Camera {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        self.ensure_started()?;

        let receiver = self
            .receiver
            .as_mut()
            .ok_or_else(|| CameraError::Channel("Receiver not initialized".to_string()))?;

        // the capture thread only hangs up after reporting why, so a closed channel is the end
        receiver.recv().await.ok_or(CameraError::Exhausted)?
    }
}

impl Drop for V4l2Camera {
    fn drop(&mut self) {
        // dropping the receiver makes the next send fail, which ends the capture thread
        drop(self.receiver.take());

        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl V4l2Camera {
    /// Open the device at `config.device()` and negotiate format, resolution and frame rate.
    ///
    /// The configured pixel format is requested first. A device that answers with the other
    /// supported format (MJPEG or YUYV) is accepted.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the device cannot be opened, offers neither MJPEG nor
    /// YUYV, or rejects the parameters.
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let device = Device::with_path(config.device())?;

        let requested = Format::new(
            config.width(),
            config.height(),
            FourCC::new(&config.format().fourcc()),
        );
        let actual = Capture::set_format(&device, &requested)?;

        let format = if actual.fourcc == FourCC::new(&PixelFormat::Mjpeg.fourcc()) {
            Negotiated::Mjpeg
        } else if actual.fourcc == FourCC::new(&PixelFormat::Yuyv.fourcc()) {
            Negotiated::Yuyv {
                width: actual.width,
                height: actual.height,
            }
        } else {
            return Err(CameraError::Device(format!(
                "{}: no supported pixel format (device offered {})",
                config.device(),
                actual.fourcc
            )));
        };

        if actual.width != config.width() || actual.height != config.height() {
            log::warn!(
                "{}: requested {}x{}, device delivers {}x{}",
                config.device(),
                config.width(),
                config.height(),
                actual.width,
                actual.height
            );
        }

        if config.fps() > 0 {
            let params = v4l::video::capture::Parameters::with_fps(config.fps());
            Capture::set_params(&device, &params)?;
        }

        log::info!(
            "opened {} as {:?} {}x{}",
            config.device(),
            format,
            actual.width,
            actual.height
        );

        Ok(Self {
            config,
            format,
            device: Some(device),
            receiver: None,
            thread_handle: None,
        })
    }

    /// Start the capture thread on first `recv()`.
    fn ensure_started(&mut self) -> Result<(), CameraError> {
        if self.receiver.is_some() {
            return Ok(());
        }

        let device = self
            .device
            .take()
            .ok_or_else(|| CameraError::Device("Device already consumed".to_string()))?;

        let buffer_count = self.config.buffer_count().max(1) as usize;
        let format = self.format;
        let (tx, rx) = mpsc::channel(buffer_count);

        let handle = thread::spawn(move || {
            capture_loop(device, format, tx, buffer_count as u32);
        });

        self.receiver = Some(rx);
        self.thread_handle = Some(handle);

        Ok(())
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }
}

fn decode_frame(format: Negotiated, data: &[u8]) -> FrameResult {
    match format {
        Negotiated::Mjpeg => {
            decode_image(data).map_err(|e| CameraError::Transient(format!("bad MJPEG frame: {e}")))
        }
        Negotiated::Yuyv { width, height } => {
            let rgb = yuyv_to_rgb(data, width, height).ok_or_else(|| {
                CameraError::Transient(format!(
                    "short YUYV frame: {} bytes for {width}x{height}",
                    data.len()
                ))
            })?;
            Tensor::new(vec![height as usize, width as usize, 3], rgb)
                .map_err(|e| CameraError::Transient(e.to_string()))
        }
    }
}

/// Reads frames until the stream fails or the receiver goes away.
fn capture_loop(device: Device, format: Negotiated, tx: mpsc::Sender<FrameResult>, buffer_count: u32) {
    let mut stream = match MmapStream::with_buffers(&device, Type::VideoCapture, buffer_count) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.blocking_send(Err(CameraError::Device(format!("no stream: {e}"))));
            return;
        }
    };

    loop {
        let frame = match CaptureStream::next(&mut stream) {
            // the mmap buffer is only valid until the next call
            Ok((data, _metadata)) => decode_frame(format, data),
            Err(e) => {
                log::error!("capture stream failed: {e}");
                let _ = tx.blocking_send(Err(CameraError::Device(e.to_string())));
                return;
            }
        };

        if let Err(e) = &frame {
            log::warn!("dropping frame: {e}");
        }

        if tx.blocking_send(frame).is_err() {
            log::debug!("frame receiver dropped, stopping capture");
            return;
        }
    }
}
