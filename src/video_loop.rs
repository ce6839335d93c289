// Capture-annotate-render loop and the actions bound to its controls

use crate::annotate::Annotator;
use crate::camera::FrameSource;
use crate::controls::{AppState, EmotionButton};
use crate::error::Result;
use crate::overlay;
use crate::schedule::TickScheduler;
use image::RgbImage;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Display surface that shows the latest annotated frame.
pub trait Canvas {
    /// Replaces the displayed image. The canvas keeps it alive while shown.
    fn present(&mut self, image: RgbImage);
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was annotated and handed to the canvas.
    Presented { people_count: usize },
    /// The camera returned no frame; the canvas was left untouched.
    CaptureFailed,
}

/// Owns the camera, the detectors and the toggle state, and runs one tick at a time.
pub struct VideoLoop {
    source: Box<dyn FrameSource>,
    annotator: Annotator,
    state: AppState,
    emotion_button: EmotionButton,
    scheduler: TickScheduler,
    source_released: bool,
}

impl VideoLoop {
    /// Creates the loop with its first tick due immediately.
    pub fn new(source: Box<dyn FrameSource>, annotator: Annotator, tick_interval: Duration) -> Self {
        let mut scheduler = TickScheduler::new(tick_interval);
        scheduler.schedule_now(Instant::now());

        Self {
            source,
            annotator,
            state: AppState::default(),
            emotion_button: EmotionButton::default(),
            scheduler,
            source_released: false,
        }
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn emotion_button_label(&self) -> &'static str {
        self.emotion_button.label()
    }

    /// Runs the emotion button's bound action.
    pub fn click_emotion_button(&mut self) {
        self.emotion_button.click(&mut self.state);
    }

    /// Time until the next tick, or `None` once the loop has stopped.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    /// Runs a tick if one is due at `now`.
    pub fn poll(&mut self, now: Instant, canvas: &mut dyn Canvas) -> Option<Result<TickOutcome>> {
        if !self.state.running || !self.scheduler.take_due(now) {
            return None;
        }
        Some(self.tick(now, canvas))
    }

    /// Reads one frame, annotates it, presents it and reschedules while running.
    pub fn tick(&mut self, now: Instant, canvas: &mut dyn Canvas) -> Result<TickOutcome> {
        let result = self.capture_and_present(canvas);

        // A failed tick is retried on the next interval
        if self.state.running {
            self.scheduler.schedule_after(now);
        } else {
            self.scheduler.cancel();
        }

        result
    }

    fn capture_and_present(&mut self, canvas: &mut dyn Canvas) -> Result<TickOutcome> {
        let mut frame = match self.source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to grab frame: {}", e);
                return Ok(TickOutcome::CaptureFailed);
            }
        };

        let annotation = self
            .annotator
            .annotate(&frame, self.state.detect_emotion)?;
        overlay::render(&mut frame, &annotation.overlays)?;

        canvas.present(frame.to_rgb_image()?);
        debug!("Presented frame with {} face(s)", annotation.people_count);

        Ok(TickOutcome::Presented {
            people_count: annotation.people_count,
        })
    }

    /// Stops the loop and releases the camera. Further calls do nothing.
    pub fn close_camera(&mut self) {
        self.state.running = false;
        self.scheduler.cancel();

        if !self.source_released {
            self.source.release();
            self.source_released = true;
            info!("Camera closed");
        }
    }
}

impl Drop for VideoLoop {
    fn drop(&mut self) {
        self.close_camera();
    }
}
