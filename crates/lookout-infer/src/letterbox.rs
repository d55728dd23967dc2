use crate::InferError;
use lookout_base::{Rect, Tensor};

/// Memory layout of a model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `[1, 3, size, size]`
    Nchw,
    /// `[1, size, size, 3]`
    Nhwc,
}

/// Letterbox transformation parameters for coordinate rescaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied to the image, `min(size / h, size / w)`.
    pub scale: f32,
    /// Horizontal padding added (in pixels)
    pub pad_x: f32,
    /// Vertical padding added (in pixels)
    pub pad_y: f32,
}

impl LetterboxInfo {
    /// Maps a point in model input space back to the source frame.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Letterboxes an RGB frame into a square model input.
///
/// The frame is resized with nearest neighbour to fit `size` while keeping its aspect ratio,
/// centered, and padded with `pad` (already in the output range). Pixel values are scaled from
/// [0, 255] to [0.0, 1.0].
pub fn letterbox(
    frame: &Tensor<u8>,
    size: usize,
    pad: f32,
    layout: Layout,
) -> Result<(Tensor<f32>, LetterboxInfo), InferError> {
    let (h, w) = match frame.hwc() {
        Some((h, w, 3)) if h > 0 && w > 0 => (h, w),
        _ => {
            return Err(InferError::ShapeMismatch {
                expected: "[H, W, 3] with H, W > 0".to_string(),
                got: format!("{:?}", frame.shape),
            });
        }
    };

    if size == 0 {
        return Err(InferError::ShapeMismatch {
            expected: "model input size > 0".to_string(),
            got: "0".to_string(),
        });
    }

    let scale = (size as f32 / w as f32).min(size as f32 / h as f32);
    let new_w = ((w as f32 * scale) as usize).clamp(1, size);
    let new_h = ((h as f32 * scale) as usize).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let plane = size * size;
    let mut data = vec![pad; 3 * plane];

    for out_y in 0..new_h {
        let src_y = ((out_y as f32 / scale) as usize).min(h - 1);
        let dst_y = out_y + pad_y;
        for out_x in 0..new_w {
            let src_x = ((out_x as f32 / scale) as usize).min(w - 1);
            let dst_x = out_x + pad_x;
            let src = (src_y * w + src_x) * 3;
            for ch in 0..3 {
                let value = frame.data[src + ch] as f32 / 255.0;
                let dst = match layout {
                    Layout::Nchw => ch * plane + dst_y * size + dst_x,
                    Layout::Nhwc => (dst_y * size + dst_x) * 3 + ch,
                };
                data[dst] = value;
            }
        }
    }

    let shape = match layout {
        Layout::Nchw => vec![1, 3, size, size],
        Layout::Nhwc => vec![1, size, size, 3],
    };

    Ok((
        Tensor::new(shape, data)?,
        LetterboxInfo {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
        },
    ))
}

/// Crops a square region of interest out of an RGB frame into a `size`x`size` model input.
///
/// `roi` is in frame pixels and may extend past the frame; pixels outside it are left at 0.0.
/// Sampling is nearest neighbour, values are scaled to [0.0, 1.0]. A point `(x, y)` of the
/// crop maps back to `roi.origin + (x, y) * roi.size / size` in the frame.
pub fn crop_square(
    frame: &Tensor<u8>,
    roi: &Rect<f32>,
    size: usize,
    layout: Layout,
) -> Result<Tensor<f32>, InferError> {
    let (h, w) = match frame.hwc() {
        Some((h, w, 3)) if h > 0 && w > 0 => (h, w),
        _ => {
            return Err(InferError::ShapeMismatch {
                expected: "[H, W, 3] with H, W > 0".to_string(),
                got: format!("{:?}", frame.shape),
            });
        }
    };
    if size == 0 {
        return Err(InferError::ShapeMismatch {
            expected: "model input size > 0".to_string(),
            got: "0".to_string(),
        });
    }

    let step_x = roi.size.x / size as f32;
    let step_y = roi.size.y / size as f32;
    let plane = size * size;
    let mut data = vec![0.0; 3 * plane];

    for out_y in 0..size {
        let src_y = (roi.origin.y + (out_y as f32 + 0.5) * step_y).floor();
        if src_y < 0.0 || src_y >= h as f32 {
            continue;
        }
        let src_y = src_y as usize;
        for out_x in 0..size {
            let src_x = (roi.origin.x + (out_x as f32 + 0.5) * step_x).floor();
            if src_x < 0.0 || src_x >= w as f32 {
                continue;
            }
            let src = (src_y * w + src_x as usize) * 3;
            for ch in 0..3 {
                let dst = match layout {
                    Layout::Nchw => ch * plane + out_y * size + out_x,
                    Layout::Nhwc => (out_y * size + out_x) * 3 + ch,
                };
                data[dst] = frame.data[src + ch] as f32 / 255.0;
            }
        }
    }

    let shape = match layout {
        Layout::Nchw => vec![1, 3, size, size],
        Layout::Nhwc => vec![1, size, size, 3],
    };
    Ok(Tensor::new(shape, data)?)
}
