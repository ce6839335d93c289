// Overlay draw commands and their OpenCV renderer

use crate::error::Result;
use crate::models::{DetectionBox, Frame};
use opencv::core::{Point, Scalar};
use opencv::imgproc;

/// BGR color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const FACE_BOX: Color = Color(89, 2, 236);
    pub const GREEN: Color = Color(0, 255, 0);
    pub const DOMINANT_EMOTION: Color = Color(224, 77, 176);
    pub const EMOTION_SCORE: Color = Color(0, 255, 255);

    fn scalar(self) -> Scalar {
        Scalar::new(self.0 as f64, self.1 as f64, self.2 as f64, 0.0)
    }
}

/// What a piece of text on the frame says about the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    Smile,
    DominantEmotion,
    EmotionScore,
    PeopleCount,
}

/// One thing to draw on a frame
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Rectangle {
        region: DetectionBox,
        color: Color,
        thickness: i32,
    },
    Text {
        kind: TextKind,
        text: String,
        /// Bottom-left corner of the text
        origin: (i32, i32),
        scale: f64,
        color: Color,
        thickness: i32,
    },
}

pub const SMILE_TEXT: &str = "Smile Detected";

impl Overlay {
    pub fn face_box(region: DetectionBox) -> Self {
        Overlay::Rectangle {
            region,
            color: Color::FACE_BOX,
            thickness: 1,
        }
    }

    pub fn smile(face: DetectionBox) -> Self {
        Overlay::Text {
            kind: TextKind::Smile,
            text: SMILE_TEXT.to_string(),
            origin: (face.x, face.y - 10),
            scale: 1.0,
            color: Color::GREEN,
            thickness: 2,
        }
    }

    pub fn dominant_emotion(face: DetectionBox, label: &str) -> Self {
        Overlay::Text {
            kind: TextKind::DominantEmotion,
            text: label.to_string(),
            origin: (face.x, face.bottom() + 20),
            scale: 1.0,
            color: Color::DOMINANT_EMOTION,
            thickness: 2,
        }
    }

    /// `line` is the zero-based row under the dominant label
    pub fn emotion_score(face: DetectionBox, line: usize, text: String) -> Self {
        Overlay::Text {
            kind: TextKind::EmotionScore,
            text,
            origin: (face.x, face.bottom() + 40 + 20 * line as i32),
            scale: 0.6,
            color: Color::EMOTION_SCORE,
            thickness: 1,
        }
    }

    pub fn people_count(count: usize) -> Self {
        Overlay::Text {
            kind: TextKind::PeopleCount,
            text: format!("People Count: {count}"),
            origin: (10, 50),
            scale: 1.0,
            color: Color::GREEN,
            thickness: 2,
        }
    }

    pub fn is_rectangle(&self) -> bool {
        matches!(self, Overlay::Rectangle { .. })
    }

    pub fn text_kind(&self) -> Option<TextKind> {
        match self {
            Overlay::Text { kind, .. } => Some(*kind),
            Overlay::Rectangle { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Overlay::Text { text, .. } => Some(text),
            Overlay::Rectangle { .. } => None,
        }
    }
}

/// Draws `overlays` onto `frame` in order.
pub fn render(frame: &mut Frame, overlays: &[Overlay]) -> Result<()> {
    let mat = frame.mat_mut();
    for overlay in overlays {
        match overlay {
            Overlay::Rectangle {
                region,
                color,
                thickness,
            } => {
                imgproc::rectangle_points(
                    mat,
                    Point::new(region.x, region.y),
                    Point::new(region.right(), region.bottom()),
                    color.scalar(),
                    *thickness,
                    imgproc::LINE_8,
                    0,
                )?;
            }
            Overlay::Text {
                text,
                origin,
                scale,
                color,
                thickness,
                ..
            } => {
                imgproc::put_text(
                    mat,
                    text,
                    Point::new(origin.0, origin.1),
                    imgproc::FONT_HERSHEY_SIMPLEX,
                    *scale,
                    color.scalar(),
                    *thickness,
                    imgproc::LINE_8,
                    false,
                )?;
            }
        }
    }
    Ok(())
}
