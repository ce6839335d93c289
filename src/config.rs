// Application configuration

use crate::detection::DetectorParams;
use nokhwa::utils::ApiBackend;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Haar cascade used to find faces in the grayscale frame.
pub const FACE_CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";
/// Haar cascade used to find smiles inside a face region.
pub const SMILE_CASCADE_FILE: &str = "haarcascade_smile.xml";
/// Seven-class facial expression model (48x48 grayscale input).
pub const EMOTION_MODEL_FILE: &str = "facial_expression_model.onnx";

/// Static configuration for the capture loop, detectors and window.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Camera device index.
    pub camera_index: u32,
    /// Capture backend hint passed to nokhwa.
    pub capture_backend: ApiBackend,
    /// Directories searched, in order, for cascade and model files.
    pub model_dirs: Vec<PathBuf>,
    /// Face cascade parameters.
    pub face_params: DetectorParams,
    /// Smile cascade parameters, applied to each face region.
    pub smile_params: DetectorParams,
    /// Face locator parameters used by the emotion classifier.
    pub classifier_face_params: DetectorParams,
    /// Delay between the end of one tick and the start of the next.
    pub tick_interval: Duration,
    /// Window title.
    pub window_title: String,
    /// Height reserved below the canvas for the control buttons.
    pub button_row_height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            capture_backend: default_capture_backend(),
            model_dirs: vec![
                PathBuf::from("assets/models"),
                PathBuf::from("/usr/share/opencv4/haarcascades"),
                PathBuf::from("/usr/local/share/opencv4/haarcascades"),
                PathBuf::from("/usr/share/opencv/haarcascades"),
            ],
            face_params: DetectorParams::new(1.1, 5, (30, 30)),
            smile_params: DetectorParams::new(1.8, 20, (0, 0)),
            classifier_face_params: DetectorParams::new(1.1, 10, (0, 0)),
            tick_interval: Duration::from_millis(10),
            window_title: "Emotion Detection".to_string(),
            button_row_height: 48.0,
        }
    }
}

impl AppConfig {
    /// Path to the face cascade.
    pub fn face_cascade_path(&self) -> PathBuf {
        self.resolve_model(FACE_CASCADE_FILE)
    }

    /// Path to the smile cascade.
    pub fn smile_cascade_path(&self) -> PathBuf {
        self.resolve_model(SMILE_CASCADE_FILE)
    }

    /// Path to the ONNX emotion model.
    pub fn emotion_model_path(&self) -> PathBuf {
        self.resolve_model(EMOTION_MODEL_FILE)
    }

    /// Returns the first existing `dir/name`, or the path under the first
    /// directory when none exists so the loader reports a useful path.
    pub fn resolve_model(&self, name: &str) -> PathBuf {
        resolve_in(&self.model_dirs, name)
    }
}

fn resolve_in(dirs: &[PathBuf], name: &str) -> PathBuf {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|path| path.exists())
        .unwrap_or_else(|| {
            dirs.first()
                .map(|dir| dir.join(name))
                .unwrap_or_else(|| Path::new(name).to_path_buf())
        })
}

/// Platform capture backend hint.
fn default_capture_backend() -> ApiBackend {
    if cfg!(target_os = "windows") {
        ApiBackend::MediaFoundation
    } else if cfg!(target_os = "macos") {
        ApiBackend::AVFoundation
    } else if cfg!(target_os = "linux") {
        ApiBackend::Video4Linux
    } else {
        ApiBackend::Auto
    }
}
