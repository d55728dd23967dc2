use crate::DetectionConfig;
use lookout_image::draw::{GLYPH_HEIGHT, TextAnchor};
use lookout_image::{Rgb, RgbCanvas};
use lookout_infer::{Detection, Gesture, HandLandmarks, HAND_CONNECTIONS};

const BOX_COLOR: Rgb = Rgb::MAGENTA;
const BOX_THICKNESS: u32 = 3;
const LABEL_COLOR: Rgb = Rgb::BLUE;
const CONNECTION_COLOR: Rgb = Rgb::WHITE;
const JOINT_COLOR: Rgb = Rgb::RED;
const JOINT_RADIUS: i32 = 3;
const GESTURE_COLOR: Rgb = Rgb::YELLOW;

/// Rounds a confidence up to two decimals, the way the demo has always printed it.
pub fn round_up_confidence(confidence: f32) -> f32 {
    (confidence * 100.0).ceil() / 100.0
}

/// Puts a label at `(x, y)`, above the point when there is room and below it otherwise.
fn draw_label(canvas: &mut RgbCanvas, x: i32, y: i32, text: &str, color: Rgb) {
    let anchor = if y >= GLYPH_HEIGHT {
        TextAnchor::BottomLeft
    } else {
        TextAnchor::TopLeft
    };
    canvas.draw_text((x, y), text, color, anchor);
}

/// Draws each selected detection as a box with its class name at the top-left corner.
///
/// Returns how many detections were drawn.
pub fn draw_detections(canvas: &mut RgbCanvas, detections: &[Detection], config: &DetectionConfig) -> usize {
    let mut drawn = 0;
    for detection in detections {
        let Some(name) = detection.class_name() else {
            log::warn!("detection with unknown class id {}", detection.class_id);
            continue;
        };
        log::debug!("class name: {name}");

        if !config.selects(detection) {
            continue;
        }

        let (x1, y1) = (detection.x1() as i32, detection.y1() as i32);
        let (x2, y2) = (detection.x2() as i32, detection.y2() as i32);
        canvas.draw_rect((x1, y1), (x2, y2), BOX_COLOR, BOX_THICKNESS);
        draw_label(canvas, x1, y1, name, LABEL_COLOR);

        log::debug!("confidence: {:.2}", round_up_confidence(detection.confidence));
        drawn += 1;
    }
    drawn
}

fn to_pixel(canvas: &RgbCanvas, x: f32, y: f32) -> (i32, i32) {
    (
        (x * canvas.width() as f32) as i32,
        (y * canvas.height() as f32) as i32,
    )
}

/// Draws the hand skeleton and joint markers.
pub fn draw_hand(canvas: &mut RgbCanvas, hand: &HandLandmarks) {
    for (a, b) in HAND_CONNECTIONS {
        let (a, b) = (hand.point(*a), hand.point(*b));
        let from = to_pixel(canvas, a.x, a.y);
        let to = to_pixel(canvas, b.x, b.y);
        canvas.draw_line(from, to, CONNECTION_COLOR);
    }
    for point in &hand.points {
        let center = to_pixel(canvas, point.x, point.y);
        canvas.fill_circle(center, JOINT_RADIUS, JOINT_COLOR);
    }
}

/// Writes `"{label} {score}"` above the hand.
pub fn draw_gesture(canvas: &mut RgbCanvas, hand: &HandLandmarks, gesture: &Gesture) {
    let bbox = hand.bounding_box();
    let (x, y) = to_pixel(canvas, bbox.origin.x, bbox.origin.y);
    let text = format!("{} {:.2}", gesture.label, gesture.score);
    draw_label(canvas, x, y - JOINT_RADIUS - 1, &text, GESTURE_COLOR);
}
