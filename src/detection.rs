// Cascade-based region detection (faces, smiles)

use crate::error::{EmotionDetectionError, Result};
use crate::models::{DetectionBox, GrayFrame};
use opencv::core::{Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::Path;
use tracing::{debug, error};

/// Fixed hyperparameters for one cascade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorParams {
    /// Image pyramid step (must be > 1.0).
    pub scale_factor: f64,
    /// Neighbouring candidates needed to keep a detection.
    pub min_neighbors: i32,
    /// Smallest object size; (0, 0) means no limit.
    pub min_size: (i32, i32),
}

impl DetectorParams {
    pub const fn new(scale_factor: f64, min_neighbors: i32, min_size: (i32, i32)) -> Self {
        Self {
            scale_factor,
            min_neighbors,
            min_size,
        }
    }
}

/// Finds rectangular regions of one pattern in a grayscale image.
pub trait RegionDetector {
    /// Returns boxes in the order the detector reports them.
    fn detect(&mut self, image: &GrayFrame) -> Result<Vec<DetectionBox>>;
}

/// Detector backed by an OpenCV Haar cascade
pub struct CascadeDetector {
    classifier: CascadeClassifier,
    params: DetectorParams,
}

impl CascadeDetector {
    /// Loads the cascade XML at `cascade_path`
    pub fn new(cascade_path: impl AsRef<Path>, params: DetectorParams) -> Result<Self> {
        let cascade_path = cascade_path.as_ref();
        let classifier =
            CascadeClassifier::new(&cascade_path.to_string_lossy()).map_err(|e| {
                error!("Failed to load Haar Cascade {:?}: {}", cascade_path, e);
                EmotionDetectionError::ModelLoad(format!(
                    "Haar Cascade load failed for {cascade_path:?}: {e}"
                ))
            })?;

        if classifier.empty()? {
            return Err(EmotionDetectionError::ModelLoad(format!(
                "Haar Cascade classifier {cascade_path:?} is empty"
            )));
        }

        debug!("Loaded cascade {:?} with {:?}", cascade_path, params);
        Ok(Self { classifier, params })
    }
}

impl RegionDetector for CascadeDetector {
    fn detect(&mut self, image: &GrayFrame) -> Result<Vec<DetectionBox>> {
        let mut found = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                image.mat(),
                &mut found,
                self.params.scale_factor,
                self.params.min_neighbors,
                0,
                Size::new(self.params.min_size.0, self.params.min_size.1),
                Size::new(0, 0),
            )
            .map_err(|e| {
                EmotionDetectionError::FaceDetection(format!("Cascade detection failed: {e}"))
            })?;

        Ok(found.iter().map(DetectionBox::from).collect())
    }
}
