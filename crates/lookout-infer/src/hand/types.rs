use lookout_base::{Rect, Vec2};

pub const HAND_LANDMARK_COUNT: usize = 21;

/// One hand landmark. `x` and `y` are normalized to [0, 1] of the frame; `z` is depth relative
/// to the wrist, on roughly the same scale as `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// Names for the 21 hand landmarks.
///
/// - **CMC**: carpometacarpal joint, the lowest joint of the thumb, near the wrist.
/// - **MCP**: metacarpophalangeal joint, the knuckles.
/// - **PIP** / **IP**: the (proximal) interphalangeal joint above the MCP.
/// - **DIP**: distal interphalangeal joint, the highest joint of a finger.
/// - **Tip**: the tip of the finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Skeleton edges between landmarks, as drawn by MediaPipe.
pub const HAND_CONNECTIONS: &[(HandLandmark, HandLandmark)] = {
    use HandLandmark::*;
    &[
        // palm
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        // thumb
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // index
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // middle
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // ring
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // pinky
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: [Landmark; HAND_LANDMARK_COUNT],
    /// Hand presence score in [0, 1].
    pub presence: f32,
    /// Handedness as seen in a mirrored (selfie) image.
    pub handedness: Handedness,
}

impl HandLandmarks {
    pub fn point(&self, landmark: HandLandmark) -> Landmark {
        self.points[landmark as usize]
    }

    /// Normalized bounding box around all landmarks.
    pub fn bounding_box(&self) -> Rect<f32> {
        let (mut min, mut max) = (
            Vec2::new(f32::INFINITY, f32::INFINITY),
            Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        );
        for p in &self.points {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        Rect::from_min_max(min, max)
    }
}
