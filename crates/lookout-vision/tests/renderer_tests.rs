mod common;

use common::{black_frame, hand_at};
use lookout_base::Tensor;
use lookout_image::{Rgb, RgbCanvas};
use lookout_infer::{Detection, Gesture, GestureLabel};
use lookout_vision::{draw_detections, draw_gesture, draw_hand, round_up_confidence, DetectionConfig};

const PERSON: usize = 0;
const CAR: usize = 2;

fn frame(width: usize, height: usize) -> Tensor<u8> {
    Tensor::zeros(vec![height, width, 3]).unwrap()
}

fn count_color(canvas: &RgbCanvas, color: Rgb, xs: std::ops::Range<usize>, ys: std::ops::Range<usize>) -> usize {
    let mut count = 0;
    for y in ys {
        for x in xs.clone() {
            if canvas.pixel(x, y) == color {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_person_box_corners_and_label() {
    let mut frame = frame(120, 100);
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let detections = vec![Detection::from_corners(10.0, 30.0, 60.0, 80.0, PERSON, 0.87)];

    let drawn = draw_detections(&mut canvas, &detections, &DetectionConfig::default());
    assert_eq!(drawn, 1);

    assert_eq!(canvas.pixel(10, 80), Rgb::MAGENTA);
    assert_eq!(canvas.pixel(60, 80), Rgb::MAGENTA);
    assert_eq!(canvas.pixel(10, 55), Rgb::MAGENTA);
    assert_eq!(canvas.pixel(60, 55), Rgb::MAGENTA);

    // thickness 3 grows inward
    assert_eq!(canvas.pixel(12, 55), Rgb::MAGENTA);
    assert_eq!(canvas.pixel(13, 55), Rgb::BLACK);
    assert_eq!(canvas.pixel(9, 55), Rgb::BLACK);
    assert_eq!(canvas.pixel(61, 55), Rgb::BLACK);
    assert_eq!(canvas.pixel(35, 81), Rgb::BLACK);

    // label sits above the top-left corner
    assert!(count_color(&canvas, Rgb::BLUE, 10..80, 10..31) > 0);
    assert_eq!(count_color(&canvas, Rgb::BLUE, 0..120, 31..100), 0);
}

#[test]
fn test_label_moves_inside_near_top_edge() {
    let mut frame = frame(120, 100);
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let detections = vec![Detection::from_corners(10.0, 2.0, 90.0, 80.0, PERSON, 0.5)];

    draw_detections(&mut canvas, &detections, &DetectionConfig::default());

    assert!(count_color(&canvas, Rgb::BLUE, 10..90, 2..23) > 0);
    assert_eq!(count_color(&canvas, Rgb::BLUE, 0..120, 23..100), 0);
}

#[test]
fn test_non_person_draws_nothing() {
    let mut frame = frame(80, 60);
    let before = frame.clone();
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let detections = vec![Detection::from_corners(5.0, 5.0, 40.0, 40.0, CAR, 0.99)];

    assert_eq!(draw_detections(&mut canvas, &detections, &DetectionConfig::default()), 0);
    assert!(frame == before);
}

#[test]
fn test_zero_detections_leave_frame_untouched() {
    let mut frame = frame(80, 60);
    frame.data.iter_mut().enumerate().for_each(|(i, v)| *v = (i % 251) as u8);
    let before = frame.clone();
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();

    assert_eq!(draw_detections(&mut canvas, &[], &DetectionConfig::default()), 0);
    assert!(frame == before);
}

#[test]
fn test_confidence_threshold_filters() {
    let mut frame = frame(80, 60);
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let config = DetectionConfig {
        confidence_threshold: 0.6,
        ..DetectionConfig::default()
    };
    let detections = vec![
        Detection::from_corners(5.0, 25.0, 30.0, 50.0, PERSON, 0.4),
        Detection::from_corners(40.0, 25.0, 70.0, 50.0, PERSON, 0.8),
    ];

    assert_eq!(draw_detections(&mut canvas, &detections, &config), 1);
    assert_eq!(canvas.pixel(5, 50), Rgb::BLACK);
    assert_eq!(canvas.pixel(70, 50), Rgb::MAGENTA);
}

#[test]
fn test_box_past_frame_edge_is_clipped() {
    let mut frame = frame(40, 30);
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let detections = vec![Detection::from_corners(-10.0, 20.0, 100.0, 200.0, PERSON, 0.9)];

    assert_eq!(draw_detections(&mut canvas, &detections, &DetectionConfig::default()), 1);
    // innermost row of the top edge, below the label
    assert_eq!(canvas.pixel(20, 22), Rgb::MAGENTA);
}

#[test]
fn test_draw_hand_marks_joints() {
    let mut frame = black_frame();
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();

    draw_hand(&mut canvas, &hand_at(0.25, 0.5));

    let (x, y) = ((canvas.width() as f32 * 0.25) as usize, canvas.height() / 2);
    assert_eq!(canvas.pixel(x, y), Rgb::RED);
    assert_eq!(canvas.pixel(x + 3, y), Rgb::RED);
    assert_eq!(canvas.pixel(x + 5, y), Rgb::BLACK);
}

#[test]
fn test_draw_gesture_text_above_hand() {
    let mut frame = frame(200, 100);
    let mut canvas = RgbCanvas::from_frame(&mut frame).unwrap();
    let gesture = Gesture {
        label: GestureLabel::Victory,
        score: 0.93,
    };

    draw_gesture(&mut canvas, &hand_at(0.1, 0.6), &gesture);

    let text_bottom = 60 - 4;
    assert!(count_color(&canvas, Rgb::YELLOW, 20..200, 0..text_bottom + 1) > 0);
    assert_eq!(count_color(&canvas, Rgb::YELLOW, 0..200, text_bottom + 1..100), 0);
}

#[test]
fn test_round_up_confidence() {
    assert_eq!(round_up_confidence(0.871), 0.88);
    assert_eq!(round_up_confidence(0.5), 0.5);
    assert_eq!(round_up_confidence(0.0), 0.0);
}
