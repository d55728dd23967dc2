use std::fmt;

/// MediaPipe's canned gesture categories, in model output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    None,
    ClosedFist,
    OpenPalm,
    PointingUp,
    ThumbDown,
    ThumbUp,
    Victory,
    ILoveYou,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 8] = [
        GestureLabel::None,
        GestureLabel::ClosedFist,
        GestureLabel::OpenPalm,
        GestureLabel::PointingUp,
        GestureLabel::ThumbDown,
        GestureLabel::ThumbUp,
        GestureLabel::Victory,
        GestureLabel::ILoveYou,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The category name MediaPipe reports, e.g. `Closed_Fist`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None => "None",
            GestureLabel::ClosedFist => "Closed_Fist",
            GestureLabel::OpenPalm => "Open_Palm",
            GestureLabel::PointingUp => "Pointing_Up",
            GestureLabel::ThumbDown => "Thumb_Down",
            GestureLabel::ThumbUp => "Thumb_Up",
            GestureLabel::Victory => "Victory",
            GestureLabel::ILoveYou => "ILoveYou",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub label: GestureLabel,
    pub score: f32,
}
