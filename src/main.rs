use emotion_detection::annotate::Annotator;
use emotion_detection::camera::{CameraManager, FrameSource};
use emotion_detection::config::AppConfig;
use emotion_detection::detection::CascadeDetector;
use emotion_detection::emotion::OnnxEmotionClassifier;
use emotion_detection::error::{EmotionDetectionError, Result};
use emotion_detection::ui::EmotionDetectionApp;
use emotion_detection::video_loop::VideoLoop;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the logging system (file only, no console output)
fn init_logging() -> Result<()> {
    let log_file =
        std::fs::File::create("emotion_detection.log").map_err(EmotionDetectionError::Io)?;

    let file_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry().with(file_layer).init();

    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    let config = AppConfig::default();

    // Any failure up to the window is fatal
    let face_detector = CascadeDetector::new(config.face_cascade_path(), config.face_params)?;
    let smile_detector = CascadeDetector::new(config.smile_cascade_path(), config.smile_params)?;
    let classifier = OnnxEmotionClassifier::new(
        config.emotion_model_path(),
        config.face_cascade_path(),
        config.classifier_face_params,
    )?;

    let camera = CameraManager::open(config.camera_index, config.capture_backend)?;
    let (width, height) = camera.resolution();
    info!("Canvas sized to {}x{}", width, height);

    let annotator = Annotator::new(
        Box::new(face_detector),
        Box::new(smile_detector),
        Box::new(classifier),
    );
    let video = VideoLoop::new(Box::new(camera), annotator, config.tick_interval);

    let result = eframe::run_native(
        &config.window_title,
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width as f32, height as f32 + config.button_row_height])
                .with_title(&config.window_title),
            ..Default::default()
        },
        Box::new(move |_cc| Ok(Box::new(EmotionDetectionApp::new(video)))),
    );

    if let Err(e) = result {
        error!("Application error: {}", e);
        return Err(EmotionDetectionError::Display(e.to_string()));
    }

    info!("Window closed");
    Ok(())
}
