// Error types for the Emotion Detection application

use thiserror::Error;

/// Main error type for the Emotion Detection application
#[derive(Debug, Error)]
pub enum EmotionDetectionError {
    #[error("Camera initialization failed: {0}")]
    CameraInit(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Frame processing failed: {0}")]
    FrameProcessing(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Face detection failed: {0}")]
    FaceDetection(String),

    #[error("Emotion classification failed: {0}")]
    Classification(String),

    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(String),

    #[error("OpenCV error: {0}")]
    OpenCV(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Emotion Detection operations
pub type Result<T> = std::result::Result<T, EmotionDetectionError>;

// Conversion from nokhwa errors
impl From<nokhwa::NokhwaError> for EmotionDetectionError {
    fn from(err: nokhwa::NokhwaError) -> Self {
        match err {
            nokhwa::NokhwaError::OpenDeviceError(device, error) => {
                EmotionDetectionError::CameraInit(format!("Device {device}: {error}"))
            }
            nokhwa::NokhwaError::OpenStreamError(error) => {
                EmotionDetectionError::CameraInit(format!("Stream: {error}"))
            }
            nokhwa::NokhwaError::ReadFrameError(error) => {
                EmotionDetectionError::CaptureFailed(error)
            }
            _ => EmotionDetectionError::CameraInit(err.to_string()),
        }
    }
}

// Conversion from OpenCV errors
impl From<opencv::Error> for EmotionDetectionError {
    fn from(err: opencv::Error) -> Self {
        EmotionDetectionError::OpenCV(err.to_string())
    }
}

// Conversion from ONNX Runtime errors
impl From<ort::Error> for EmotionDetectionError {
    fn from(err: ort::Error) -> Self {
        EmotionDetectionError::OnnxRuntime(err.to_string())
    }
}
