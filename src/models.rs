// Core data models for the Emotion Detection application

use crate::error::{EmotionDetectionError, Result};
use opencv::core::{Mat, Rect, Scalar, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;

/// A single captured video frame in BGR channel order (8-bit, 3 channels).
///
/// Overlays are drawn into it in place; it lives for one tick.
#[derive(Debug)]
pub struct Frame {
    mat: Mat,
}

impl Frame {
    /// Builds a frame from packed RGB bytes (width * height * 3), as delivered by the camera.
    pub fn from_rgb(data: &[u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(EmotionDetectionError::FrameProcessing(format!(
                "RGB buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }

        let rgb = Mat::from_slice(data)?;
        let rgb = rgb.reshape(3, height as i32)?;

        let mut bgr = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR)?;
        Ok(Self { mat: bgr })
    }

    /// A black frame of the given size.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        let mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        Ok(Self { mat })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.mat.cols().max(0) as u32
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.mat.rows().max(0) as u32
    }

    /// Underlying BGR matrix
    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    /// Mutable BGR matrix, used to draw overlays in place
    pub fn mat_mut(&mut self) -> &mut Mat {
        &mut self.mat
    }

    /// Grayscale copy used by the cascade detectors.
    pub fn to_gray(&self) -> Result<GrayFrame> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(&self.mat, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        Ok(GrayFrame { mat: gray })
    }

    /// Converts to an RGB image for display.
    pub fn to_rgb_image(&self) -> Result<image::RgbImage> {
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&self.mat, &mut rgb, imgproc::COLOR_BGR2RGB)?;
        let bytes = rgb.data_bytes()?.to_vec();

        image::RgbImage::from_raw(self.width(), self.height(), bytes).ok_or_else(|| {
            EmotionDetectionError::FrameProcessing(
                "RGB buffer does not match frame dimensions".to_string(),
            )
        })
    }
}

/// Single-channel grayscale image (a whole frame or a cropped region of one).
#[derive(Debug)]
pub struct GrayFrame {
    mat: Mat,
}

impl GrayFrame {
    /// A black grayscale image of the given size.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        let mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            opencv::core::CV_8UC1,
            Scalar::all(0.0),
        )?;
        Ok(Self { mat })
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.mat.cols().max(0) as u32
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.mat.rows().max(0) as u32
    }

    /// Underlying single-channel matrix
    pub fn mat(&self) -> &Mat {
        &self.mat
    }

    /// Copies out the region under `region`, clamped to the image bounds.
    pub fn crop(&self, region: DetectionBox) -> Result<GrayFrame> {
        let clamped = region.clamp_to(self.width(), self.height()).ok_or_else(|| {
            EmotionDetectionError::FaceDetection(format!(
                "Region {region:?} lies outside the {}x{} image",
                self.width(),
                self.height()
            ))
        })?;

        let roi = Mat::roi(&self.mat, clamped.into())?;
        // Clone the ROI so the crop is continuous in memory
        let mat = roi.try_clone()?;
        Ok(GrayFrame { mat })
    }
}

/// Axis-aligned rectangle reported by a detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectionBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DetectionBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Intersects the box with a `width` x `height` image.
    /// Returns `None` when nothing of it remains.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<DetectionBox> {
        let x0 = self.x.clamp(0, width as i32);
        let y0 = self.y.clamp(0, height as i32);
        let x1 = self.right().clamp(0, width as i32);
        let y1 = self.bottom().clamp(0, height as i32);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DetectionBox::new(x0, y0, x1 - x0, y1 - y0))
    }
}

impl From<Rect> for DetectionBox {
    fn from(rect: Rect) -> Self {
        Self::new(rect.x, rect.y, rect.width, rect.height)
    }
}

impl From<DetectionBox> for Rect {
    fn from(region: DetectionBox) -> Self {
        Rect::new(region.x, region.y, region.width, region.height)
    }
}

/// Emotion classes reported by the facial expression model, in output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionState {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl EmotionState {
    /// All classes in model output order.
    pub const ALL: [EmotionState; 7] = [
        EmotionState::Angry,
        EmotionState::Disgust,
        EmotionState::Fear,
        EmotionState::Happy,
        EmotionState::Sad,
        EmotionState::Surprise,
        EmotionState::Neutral,
    ];

    /// Maps a model output index to its class.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmotionState::Angry => "angry",
            EmotionState::Disgust => "disgust",
            EmotionState::Fear => "fear",
            EmotionState::Happy => "happy",
            EmotionState::Sad => "sad",
            EmotionState::Surprise => "surprise",
            EmotionState::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for EmotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Emotion distribution for one frame: per-class scores in percent, plus the dominant class
#[derive(Clone, Debug, PartialEq)]
pub struct EmotionAnalysis {
    /// Highest-scoring class
    pub dominant: EmotionState,
    /// (class, score in percent) pairs in classifier order
    pub scores: Vec<(EmotionState, f32)>,
}

impl EmotionAnalysis {
    /// Builds an analysis from scores, picking the highest as dominant.
    /// Ties go to the earliest class. Returns `None` for an empty distribution.
    pub fn from_scores(scores: Vec<(EmotionState, f32)>) -> Option<Self> {
        let dominant = scores
            .iter()
            .fold(None::<(EmotionState, f32)>, |best, &(emotion, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((emotion, score)),
            })?
            .0;

        Some(Self { dominant, scores })
    }

    /// Score lines as drawn under the face, e.g. `happy: 97.12`.
    pub fn score_lines(&self) -> Vec<String> {
        self.scores
            .iter()
            .map(|(emotion, score)| format!("{emotion}: {score:.2}"))
            .collect()
    }
}
