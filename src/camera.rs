// Camera module for webcam capture

use crate::error::{EmotionDetectionError, Result};
use crate::models::Frame;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{error, info, warn};

/// Source of frames for the capture loop.
pub trait FrameSource {
    /// Reads exactly one frame.
    fn read_frame(&mut self) -> Result<Frame>;

    /// Native (width, height) of the frames this source delivers.
    fn resolution(&self) -> (u32, u32);

    /// Releases the underlying device. Calling it again is a no-op.
    fn release(&mut self);
}

/// Owns the webcam handle
pub struct CameraManager {
    camera: Camera,
    released: bool,
}

impl CameraManager {
    /// Opens the camera at `index` through `backend` and starts its stream
    pub fn open(index: u32, backend: ApiBackend) -> Result<Self> {
        let requested_format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = Camera::with_backend(CameraIndex::Index(index), requested_format, backend)
            .map_err(|e| {
                error!("Failed to open camera {} via {:?}: {}", index, backend, e);
                EmotionDetectionError::CameraInit(format!(
                    "Cannot open webcam {index}. Make sure:\n\
                    1. A camera is connected\n\
                    2. No other app is using it\n\
                    3. Camera permissions are granted\n\
                    Error: {e}"
                ))
            })?;

        camera.open_stream().map_err(|e| {
            error!("Failed to open camera stream: {}", e);
            EmotionDetectionError::CameraInit(e.to_string())
        })?;

        let resolution = camera.resolution();
        info!(
            "Opened camera {} ({}) at {}x{}",
            index,
            camera.info().human_name(),
            resolution.width(),
            resolution.height()
        );

        Ok(Self {
            camera,
            released: false,
        })
    }
}

impl FrameSource for CameraManager {
    fn read_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(EmotionDetectionError::CaptureFailed(
                "Camera has been released".to_string(),
            ));
        }

        let frame_data = self.camera.frame().map_err(|e| {
            EmotionDetectionError::CaptureFailed(format!("Failed to capture frame: {e}"))
        })?;

        let buffer = frame_data.decode_image::<RgbFormat>().map_err(|e| {
            EmotionDetectionError::CaptureFailed(format!("Failed to decode frame: {e}"))
        })?;

        let (width, height) = (buffer.width(), buffer.height());
        Frame::from_rgb(&buffer.into_raw(), width, height)
    }

    fn resolution(&self) -> (u32, u32) {
        let res = self.camera.resolution();
        (res.width(), res.height())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Err(e) = self.camera.stop_stream() {
            warn!("Error stopping camera stream: {}", e);
        }
        info!("Camera released");
    }
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        self.release();
    }
}
