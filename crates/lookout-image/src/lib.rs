//! Image handling for lookout frames.
//!
//! Frames are `Tensor<u8>` in HWC layout `[height, width, 3]` with RGB channel order.
//! This crate decodes camera/replay images into that layout, converts pixel formats, and draws
//! annotations in place.

pub mod convert;
pub mod draw;
pub mod error;

pub use convert::{rgb_to_argb, yuyv_to_rgb};
pub use draw::{Rgb, RgbCanvas, TextAnchor};
pub use error::ImageError;

use crates_image::{DynamicImage, ImageEncoder};
use lookout_base::Tensor;

/// Decodes an encoded image (JPEG, PNG) into an RGB frame.
///
/// Grayscale, alpha and 16-bit inputs are converted to 8-bit RGB, so the result always has
/// shape `[height, width, 3]`.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is invalid or the format is unsupported.
pub fn decode_image(data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    let rgb = match crates_image::load_from_memory(data)? {
        DynamicImage::ImageRgb8(buf) => buf,
        other => other.to_rgb8(),
    };
    let (width, height) = rgb.dimensions();
    Ok(Tensor::new(
        vec![height as usize, width as usize, 3],
        rgb.into_raw(),
    )?)
}

/// Encodes an RGB frame as JPEG. `quality` runs from 1 to 100.
pub fn encode_jpeg(frame: &Tensor<u8>, quality: u8) -> Result<Vec<u8>, ImageError> {
    let (height, width) = match frame.hwc() {
        Some((h, w, 3)) => (h, w),
        _ => {
            return Err(ImageError::Encode(format!(
                "expected a [height, width, 3] frame, got shape {:?}",
                frame.shape
            )));
        }
    };

    let mut buffer = Vec::new();
    crates_image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &frame.data,
            width as u32,
            height as u32,
            crates_image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}
