use crate::{Camera, CameraError};
use lookout_base::Tensor;
use lookout_image::decode_image;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

const EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

enum Entry {
    File(PathBuf),
    Encoded(Vec<u8>),
}

/// A camera that replays still images, one frame per image, then reports `Exhausted`.
pub struct ImageSequence {
    entries: VecDeque<Entry>,
    interval: Option<Duration>,
    started: bool,
}

impl std::fmt::Debug for ImageSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSequence")
            .field("remaining", &self.entries.len())
            .field("interval", &self.interval)
            .finish()
    }
}

impl ImageSequence {
    /// Replay every `.jpg`, `.jpeg` and `.png` file in `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns `CameraError::Device` if the directory cannot be read.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .map_err(|e| CameraError::Device(format!("{}: {e}", dir.display())))?
        {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        log::info!("replaying {} images from {}", paths.len(), dir.display());
        Ok(Self {
            entries: paths.into_iter().map(Entry::File).collect(),
            interval: None,
            started: false,
        })
    }

    /// Replay already encoded images in the given order.
    pub fn from_encoded(images: Vec<Vec<u8>>) -> Self {
        Self {
            entries: images.into_iter().map(Entry::Encoded).collect(),
            interval: None,
            started: false,
        }
    }

    /// Wait `interval` before each frame after the first, to mimic a live camera.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Frames left to replay.
    pub fn remaining(&self) -> usize {
        self.entries.len()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

impl Camera for ImageSequence {
    async fn recv(&mut self) -> Result<Tensor<u8>, CameraError> {
        let entry = self.entries.pop_front().ok_or(CameraError::Exhausted)?;

        if let Some(interval) = self.interval {
            if self.started {
                tokio::time::sleep(interval).await;
            }
        }
        self.started = true;

        match entry {
            Entry::File(path) => {
                let data = tokio::fs::read(&path)
                    .await
                    .map_err(|e| CameraError::Transient(format!("{}: {e}", path.display())))?;
                decode_image(&data)
                    .map_err(|e| CameraError::Transient(format!("{}: {e}", path.display())))
            }
            Entry::Encoded(data) => {
                decode_image(&data).map_err(|e| CameraError::Transient(e.to_string()))
            }
        }
    }
}
