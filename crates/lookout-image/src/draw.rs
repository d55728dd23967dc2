use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    text::{Baseline, Text},
};
use lookout_base::Tensor;
use std::convert::Infallible;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const RED: Rgb = Rgb([255, 0, 0]);
    pub const GREEN: Rgb = Rgb([0, 255, 0]);
    pub const BLUE: Rgb = Rgb([0, 0, 255]);
    pub const MAGENTA: Rgb = Rgb([255, 0, 255]);
    pub const YELLOW: Rgb = Rgb([255, 255, 0]);
    pub const CYAN: Rgb = Rgb([0, 255, 255]);
}

/// Glyph cell size of the label font, in pixels.
pub const GLYPH_WIDTH: i32 = 10;
pub const GLYPH_HEIGHT: i32 = 20;

/// Where a text's anchor point sits relative to the rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// The point is the top-left of the first glyph.
    TopLeft,
    /// The point is the bottom-left of the first glyph; the text sits above it.
    BottomLeft,
}

/// Mutable view over an HWC RGB frame buffer. All drawing is clipped to the canvas.
pub struct RgbCanvas<'a> {
    buf: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> RgbCanvas<'a> {
    /// Wraps a raw buffer. Returns `None` if it holds fewer than `width * height * 3` bytes.
    pub fn new(buf: &'a mut [u8], width: usize, height: usize) -> Option<Self> {
        if buf.len() < width * height * 3 {
            return None;
        }
        Some(Self { buf, width, height })
    }

    /// Wraps a `[height, width, 3]` frame tensor.
    pub fn from_frame(frame: &'a mut Tensor<u8>) -> Option<Self> {
        match frame.hwc() {
            Some((h, w, 3)) => Self::new(&mut frame.data, w, h),
            _ => None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let idx = (y * self.width + x) * 3;
        Rgb([self.buf[idx], self.buf[idx + 1], self.buf[idx + 2]])
    }

    /// Sets one pixel; coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if self.contains(x, y) {
            let idx = (y as usize * self.width + x as usize) * 3;
            self.buf[idx..idx + 3].copy_from_slice(&color.0);
        }
    }

    /// Draws a 1 pixel line using Bresenham's algorithm, clipped with Cohen-Sutherland.
    pub fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb) {
        let Some(((mut x0, mut y0), (x1, y1))) =
            clip_line(from, to, self.width as i32, self.height as i32)
        else {
            return;
        };

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Draws a rectangle outline whose outer edge passes exactly through both corners.
    ///
    /// Additional thickness grows inward, so nothing is drawn outside the rectangle.
    pub fn draw_rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: Rgb, thickness: u32) {
        let (x1, y1) = (top_left.0.min(bottom_right.0), top_left.1.min(bottom_right.1));
        let (x2, y2) = (top_left.0.max(bottom_right.0), top_left.1.max(bottom_right.1));

        for t in 0..thickness.max(1) as i32 {
            let (l, t_, r, b) = (x1 + t, y1 + t, x2 - t, y2 - t);
            if l > r || t_ > b {
                break;
            }
            self.draw_line((l, t_), (r, t_), color);
            self.draw_line((l, b), (r, b), color);
            self.draw_line((l, t_), (l, b), color);
            self.draw_line((r, t_), (r, b), color);
        }
    }

    pub fn fill_circle(&mut self, center: (i32, i32), radius: i32, color: Rgb) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(center.0 + dx, center.1 + dy, color);
                }
            }
        }
    }

    /// Renders `text` in the 10x20 ASCII mono font.
    pub fn draw_text(&mut self, at: (i32, i32), text: &str, color: Rgb, anchor: TextAnchor) {
        let style = MonoTextStyle::new(&FONT_10X20, Rgb888::new(color.0[0], color.0[1], color.0[2]));
        let baseline = match anchor {
            TextAnchor::TopLeft => Baseline::Top,
            TextAnchor::BottomLeft => Baseline::Bottom,
        };
        match Text::with_baseline(text, Point::new(at.0, at.1), style, baseline).draw(self) {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

impl OriginDimensions for RgbCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for RgbCanvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, Rgb([color.r(), color.g(), color.b()]));
        }
        Ok(())
    }
}

// Cohen-Sutherland outcodes
const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

/// Clips a segment to `[0, width) x [0, height)`. `None` if no part of it is visible.
fn clip_line(
    (mut x0, mut y0): (i32, i32),
    (mut x1, mut y1): (i32, i32),
    width: i32,
    height: i32,
) -> Option<((i32, i32), (i32, i32))> {
    if width <= 0 || height <= 0 {
        return None;
    }
    loop {
        let code0 = outcode(x0, y0, width, height);
        let code1 = outcode(x1, y1, width, height);

        if code0 | code1 == 0 {
            return Some(((x0, y0), (x1, y1)));
        }
        if code0 & code1 != 0 {
            return None;
        }

        let code = if code0 != 0 { code0 } else { code1 };
        let (dx, dy) = ((x1 - x0) as i64, (y1 - y0) as i64);
        let (x, y) = if code & TOP != 0 {
            (x0 + (dx * (0 - y0) as i64 / dy) as i32, 0)
        } else if code & BOTTOM != 0 {
            (x0 + (dx * (height - 1 - y0) as i64 / dy) as i32, height - 1)
        } else if code & LEFT != 0 {
            (0, y0 + (dy * (0 - x0) as i64 / dx) as i32)
        } else {
            (width - 1, y0 + (dy * (width - 1 - x0) as i64 / dx) as i32)
        };

        if code == code0 {
            (x0, y0) = (x, y);
        } else {
            (x1, y1) = (x, y);
        }
    }
}
