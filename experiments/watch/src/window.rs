use lookout_base::{log, Tensor};
use lookout_image::rgb_to_argb;
use lookout_vision::{Display, DisplayError};
use minifb::{Key, Window, WindowOptions};

const TARGET_FPS: usize = 30;

/// A minifb window, opened at the size of the first frame it is given.
pub struct MinifbDisplay {
    title: String,
    window: Option<Window>,
}

impl MinifbDisplay {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window: None,
        }
    }

    fn open(&mut self, width: usize, height: usize) -> Result<&mut Window, DisplayError> {
        if self.window.is_none() {
            let mut window = Window::new(&self.title, width, height, WindowOptions::default())
                .map_err(|e| DisplayError::Backend(e.to_string()))?;
            window.set_target_fps(TARGET_FPS);
            log::info!("opened {width}x{height} window '{}'", self.title);
            self.window = Some(window);
        }
        self.window
            .as_mut()
            .ok_or_else(|| DisplayError::Backend("window missing".to_string()))
    }
}

pub fn is_quit_key(key: Key) -> bool {
    matches!(key, Key::Q | Key::Escape)
}

impl Display for MinifbDisplay {
    fn present(&mut self, frame: &Tensor<u8>) -> Result<(), DisplayError> {
        let Some((height, width, 3)) = frame.hwc() else {
            return Err(DisplayError::Backend(format!(
                "expected a [height, width, 3] frame, got {:?}",
                frame.shape
            )));
        };
        let window = self.open(width, height)?;
        if !window.is_open() {
            return Err(DisplayError::Closed);
        }
        let argb = rgb_to_argb(&frame.data, width, height);
        window
            .update_with_buffer(&argb, width, height)
            .map_err(|e| DisplayError::Backend(e.to_string()))
    }

    fn quit_requested(&mut self) -> bool {
        match &self.window {
            Some(window) => !window.is_open() || window.get_keys().into_iter().any(is_quit_key),
            None => false,
        }
    }
}
