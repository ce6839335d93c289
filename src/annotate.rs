// Per-frame annotation: faces, smiles, emotions and the people count

use crate::detection::RegionDetector;
use crate::emotion::EmotionClassifier;
use crate::error::Result;
use crate::models::{DetectionBox, Frame, GrayFrame};
use crate::overlay::Overlay;
use tracing::{debug, warn};

/// Overlays computed for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    pub overlays: Vec<Overlay>,
    /// Faces processed this tick
    pub people_count: usize,
}

/// Runs the detectors and the classifier over a frame and turns their output into overlays
pub struct Annotator {
    face_detector: Box<dyn RegionDetector>,
    smile_detector: Box<dyn RegionDetector>,
    classifier: Box<dyn EmotionClassifier>,
}

impl Annotator {
    pub fn new(
        face_detector: Box<dyn RegionDetector>,
        smile_detector: Box<dyn RegionDetector>,
        classifier: Box<dyn EmotionClassifier>,
    ) -> Self {
        Self {
            face_detector,
            smile_detector,
            classifier,
        }
    }

    /// Computes the overlays for `frame`. The frame itself is not modified.
    pub fn annotate(&mut self, frame: &Frame, detect_emotion: bool) -> Result<Annotation> {
        let gray = frame.to_gray()?;
        let faces = self.face_detector.detect(&gray)?;
        debug!("Detected {} face(s)", faces.len());

        let mut overlays = Vec::new();
        let mut people_count = 0;

        for face in faces {
            overlays.push(Overlay::face_box(face));

            if self.has_smile(&gray, face)? {
                overlays.push(Overlay::smile(face));
            }

            if detect_emotion {
                // The classifier sees the whole frame, once per face
                match self.classifier.analyze(frame) {
                    Ok(analysis) => {
                        overlays.push(Overlay::dominant_emotion(face, analysis.dominant.label()));
                        for (line, text) in analysis.score_lines().into_iter().enumerate() {
                            overlays.push(Overlay::emotion_score(face, line, text));
                        }
                    }
                    Err(e) => warn!("Emotion detection failed: {}", e),
                }
            }

            people_count += 1;
        }

        overlays.push(Overlay::people_count(people_count));

        Ok(Annotation {
            overlays,
            people_count,
        })
    }

    fn has_smile(&mut self, gray: &GrayFrame, face: DetectionBox) -> Result<bool> {
        if face.clamp_to(gray.width(), gray.height()).is_none() {
            debug!("Face {:?} lies outside the frame, skipping smile detection", face);
            return Ok(false);
        }

        let face_region = gray.crop(face)?;
        let smiles = self.smile_detector.detect(&face_region)?;
        Ok(!smiles.is_empty())
    }
}
