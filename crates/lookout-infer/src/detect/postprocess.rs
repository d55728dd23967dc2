use super::types::Detection;
use crate::{InferError, LetterboxInfo};
use lookout_base::{Rect, Tensor, Vec2};

/// Intersection over Union between two boxes.
///
/// Returns 0.0 for non-overlapping boxes or zero-area boxes (no division by zero).
pub fn iou(a: &Rect<f32>, b: &Rect<f32>) -> f32 {
    if a.size.x <= 0.0 || a.size.y <= 0.0 || b.size.x <= 0.0 || b.size.y <= 0.0 {
        return 0.0;
    }

    let intersection_area = a.intersection(b).map(|rect| rect.area()).unwrap_or(0.0);
    let union_area = a.area() + b.area() - intersection_area;
    if union_area <= 0.0 {
        return 0.0;
    }

    intersection_area / union_area
}

/// Post-processes a YOLO detection output of shape `[1, 4 + C, N]`.
///
/// Each of the N candidates carries `cx, cy, w, h` in letterboxed input pixels followed by C
/// class scores. Candidates whose best score is below `conf_threshold` are dropped, the rest
/// are mapped back into the `frame_width` x `frame_height` frame (clipped to its pixel grid,
/// `0..=width - 1` and `0..=height - 1`) and reduced
/// with class-aware greedy NMS at `iou_threshold`.
///
/// Returns at most `max_detections`, sorted by confidence descending.
pub fn postprocess(
    output: &Tensor<f32>,
    letterbox: &LetterboxInfo,
    frame_width: usize,
    frame_height: usize,
    conf_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
) -> Result<Vec<Detection>, InferError> {
    let (features, n) = match output.shape.as_slice() {
        &[1, features, n] if features > 4 => (features, n),
        _ => {
            return Err(InferError::ShapeMismatch {
                expected: "[1, 4 + classes, N]".to_string(),
                got: format!("{:?}", output.shape),
            });
        }
    };

    // the far edge is the last pixel row/column, so a box drawn there stays on the frame
    let max_x = frame_width.saturating_sub(1) as f32;
    let max_y = frame_height.saturating_sub(1) as f32;

    // element [0, row, col] sits at row * n + col
    let at = |row: usize, col: usize| output.data[row * n + col];

    let mut candidates = Vec::new();
    for i in 0..n {
        let (class_id, confidence) = (4..features)
            .map(|row| (row - 4, at(row, i)))
            .fold((0, f32::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });

        if confidence < conf_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.to_source(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_source(cx + w / 2.0, cy + h / 2.0);

        let min = Vec2::new(x1.clamp(0.0, max_x), y1.clamp(0.0, max_y));
        let max = Vec2::new(x2.clamp(0.0, max_x), y2.clamp(0.0, max_y));

        candidates.push(Detection {
            bbox: Rect::from_min_max(min, max),
            class_id,
            confidence,
        });
    }

    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        if keep.len() == max_detections {
            break;
        }

        for j in (i + 1)..candidates.len() {
            if suppressed[j] || candidates[i].class_id != candidates[j].class_id {
                continue;
            }
            if iou(&candidates[i].bbox, &candidates[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }

        keep.push(candidates[i].clone());
    }

    Ok(keep)
}
