// Emotion classification via ONNX Runtime

use crate::detection::{CascadeDetector, DetectorParams, RegionDetector};
use crate::error::{EmotionDetectionError, Result};
use crate::models::{EmotionAnalysis, EmotionState, Frame, GrayFrame};
use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::*;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use tracing::{debug, error};

/// Side length of the square grayscale model input
const INPUT_SIDE: usize = 48;

/// Produces an emotion distribution for a frame.
pub trait EmotionClassifier {
    fn analyze(&mut self, frame: &Frame) -> Result<EmotionAnalysis>;
}

/// Seven-class facial expression model.
///
/// The classifier receives the whole frame and locates a face on its own with a
/// cascade. When none is found it classifies the whole frame instead of failing.
pub struct OnnxEmotionClassifier {
    session: Session,
    face_locator: CascadeDetector,
}

impl OnnxEmotionClassifier {
    /// Loads the ONNX model and the face cascade used to locate the face
    pub fn new(
        model_path: impl AsRef<Path>,
        cascade_path: impl AsRef<Path>,
        locator_params: DetectorParams,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = Session::builder()
            .map_err(|e| {
                EmotionDetectionError::ModelLoad(format!("Failed to create session builder: {e}"))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load ONNX model {:?}: {}", model_path, e);
                EmotionDetectionError::ModelLoad(format!("ONNX model load failed: {e}"))
            })?;

        let face_locator = CascadeDetector::new(cascade_path, locator_params)?;

        Ok(Self {
            session,
            face_locator,
        })
    }

    /// Grayscale face crop (or whole frame) resized to the model input, scaled to [0, 1]
    fn preprocess(&mut self, frame: &Frame) -> Result<Vec<f32>> {
        let gray = frame.to_gray()?;
        let faces = self.face_locator.detect(&gray)?;

        let region = match faces.first() {
            Some(face) => gray.crop(*face)?,
            None => {
                debug!("No face located by the classifier, analyzing the whole frame");
                gray
            }
        };

        resize_normalized(&region)
    }

    fn infer(&mut self, input: Vec<f32>) -> Result<Vec<f32>> {
        let input_array = ndarray::Array4::from_shape_vec((1, INPUT_SIDE, INPUT_SIDE, 1), input)
            .map_err(|e| {
                EmotionDetectionError::OnnxRuntime(format!("Failed to create input array: {e}"))
            })?;

        let input_tensor = Value::from_array(input_array).map_err(|e| {
            EmotionDetectionError::OnnxRuntime(format!("Failed to create input tensor: {e}"))
        })?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| EmotionDetectionError::OnnxRuntime(format!("Inference failed: {e}")))?;

        let (_, output_value) = outputs
            .iter()
            .next()
            .ok_or_else(|| EmotionDetectionError::OnnxRuntime("No output from model".to_string()))?;

        let (_, values) = output_value.try_extract_tensor::<f32>().map_err(|e| {
            EmotionDetectionError::OnnxRuntime(format!("Failed to extract output tensor: {e}"))
        })?;

        Ok(values.to_vec())
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn analyze(&mut self, frame: &Frame) -> Result<EmotionAnalysis> {
        let input = self.preprocess(frame)?;
        let outputs = self.infer(input)?;
        analysis_from_outputs(&outputs)
    }
}

fn resize_normalized(region: &GrayFrame) -> Result<Vec<f32>> {
    let mut resized = Mat::default();
    imgproc::resize(
        region.mat(),
        &mut resized,
        Size::new(INPUT_SIDE as i32, INPUT_SIDE as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )
    .map_err(|e| EmotionDetectionError::FrameProcessing(format!("Failed to resize face: {e}")))?;

    let data = resized.data_bytes().map_err(|e| {
        EmotionDetectionError::FrameProcessing(format!("Failed to get resized data: {e}"))
    })?;

    Ok(data.iter().map(|&pixel| pixel as f32 / 255.0).collect())
}

/// Turns raw model outputs into percentages per class.
pub fn analysis_from_outputs(outputs: &[f32]) -> Result<EmotionAnalysis> {
    if outputs.len() != EmotionState::ALL.len() {
        return Err(EmotionDetectionError::Classification(format!(
            "Expected {} class scores, got {}",
            EmotionState::ALL.len(),
            outputs.len()
        )));
    }

    let scores = to_probabilities(outputs)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, p)| EmotionState::from_index(idx).map(|e| (e, p * 100.0)))
        .collect();

    EmotionAnalysis::from_scores(scores)
        .ok_or_else(|| EmotionDetectionError::Classification("Empty distribution".to_string()))
}

/// Keeps outputs that already form a distribution; applies softmax to logits otherwise
pub fn to_probabilities(outputs: &[f32]) -> Vec<f32> {
    let sum: f32 = outputs.iter().sum();
    let is_distribution =
        outputs.iter().all(|&x| (0.0..=1.0).contains(&x)) && (sum - 1.0).abs() < 1e-3;
    if is_distribution {
        return outputs.to_vec();
    }

    let max_logit = outputs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp_sum: f32 = outputs.iter().map(|&x| (x - max_logit).exp()).sum();
    outputs
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .collect()
}
