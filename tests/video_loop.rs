use emotion_detection::annotate::Annotator;
use emotion_detection::camera::FrameSource;
use emotion_detection::detection::RegionDetector;
use emotion_detection::emotion::EmotionClassifier;
use emotion_detection::error::{EmotionDetectionError, Result};
use emotion_detection::models::{DetectionBox, EmotionAnalysis, EmotionState, Frame, GrayFrame};
use emotion_detection::overlay::{Overlay, TextKind};
use emotion_detection::video_loop::{Canvas, TickOutcome, VideoLoop};
use image::RgbImage;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const TICK: Duration = Duration::from_millis(10);

/// Frame source that replays scripted reads and counts releases
struct ScriptedSource {
    reads: VecDeque<bool>,
    releases: Rc<Cell<usize>>,
}

impl ScriptedSource {
    fn new(reads: &[bool], releases: Rc<Cell<usize>>) -> Self {
        Self {
            reads: reads.iter().copied().collect(),
            releases,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn read_frame(&mut self) -> Result<Frame> {
        match self.reads.pop_front() {
            Some(true) => Frame::blank(WIDTH, HEIGHT),
            _ => Err(EmotionDetectionError::CaptureFailed("no frame".to_string())),
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// Detector that reports the same boxes for every image
struct FixedDetector(Vec<DetectionBox>);

impl RegionDetector for FixedDetector {
    fn detect(&mut self, _image: &GrayFrame) -> Result<Vec<DetectionBox>> {
        Ok(self.0.clone())
    }
}

/// What the classifier was handed on one call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SeenFrame {
    size: (u32, u32),
    /// Nonzero grayscale pixels; zero means nothing was drawn on the blank frame yet
    lit_pixels: i32,
}

type SeenFrames = Rc<RefCell<Vec<SeenFrame>>>;

/// Classifier that replays scripted outcomes and records every frame it receives
struct ScriptedClassifier {
    outcomes: VecDeque<bool>,
    calls: SeenFrames,
}

impl EmotionClassifier for ScriptedClassifier {
    fn analyze(&mut self, frame: &Frame) -> Result<EmotionAnalysis> {
        let lit_pixels = opencv::core::count_non_zero(frame.to_gray()?.mat())?;
        self.calls.borrow_mut().push(SeenFrame {
            size: (frame.width(), frame.height()),
            lit_pixels,
        });
        match self.outcomes.pop_front() {
            Some(true) => Ok(happy_analysis()),
            _ => Err(EmotionDetectionError::Classification("model exploded".to_string())),
        }
    }
}

#[derive(Default)]
struct RecordingCanvas {
    shown: Rc<RefCell<Vec<RgbImage>>>,
}

impl Canvas for RecordingCanvas {
    fn present(&mut self, image: RgbImage) {
        self.shown.borrow_mut().push(image);
    }
}

fn happy_analysis() -> EmotionAnalysis {
    let scores = EmotionState::ALL
        .iter()
        .map(|&e| (e, if e == EmotionState::Happy { 94.0 } else { 1.0 }))
        .collect();
    EmotionAnalysis::from_scores(scores).unwrap()
}

fn faces(count: usize) -> Vec<DetectionBox> {
    (0..count)
        .map(|i| DetectionBox::new(10 + 100 * i as i32, 60, 80, 80))
        .collect()
}

fn annotator(
    face_boxes: Vec<DetectionBox>,
    smile_boxes: Vec<DetectionBox>,
    classifier_outcomes: &[bool],
    classifier_calls: SeenFrames,
) -> Annotator {
    Annotator::new(
        Box::new(FixedDetector(face_boxes)),
        Box::new(FixedDetector(smile_boxes)),
        Box::new(ScriptedClassifier {
            outcomes: classifier_outcomes.iter().copied().collect(),
            calls: classifier_calls,
        }),
    )
}

fn count_kind(overlays: &[Overlay], kind: TextKind) -> usize {
    overlays
        .iter()
        .filter(|o| o.text_kind() == Some(kind))
        .count()
}

fn people_count_text(overlays: &[Overlay]) -> Option<&str> {
    overlays
        .iter()
        .find(|o| o.text_kind() == Some(TextKind::PeopleCount))
        .and_then(|o| o.text())
}

#[test]
fn test_no_faces_reports_zero_people() {
    let calls = SeenFrames::default();
    let mut annotator = annotator(Vec::new(), faces(1), &[true], calls.clone());
    let frame = Frame::blank(WIDTH, HEIGHT).unwrap();

    let annotation = annotator.annotate(&frame, true).unwrap();

    assert_eq!(annotation.people_count, 0);
    assert_eq!(people_count_text(&annotation.overlays), Some("People Count: 0"));
    assert_eq!(annotation.overlays.len(), 1);
    assert_eq!(calls.borrow().len(), 0);
}

#[test]
fn test_faces_without_emotion_detection() {
    let calls = SeenFrames::default();
    let mut annotator = annotator(faces(3), Vec::new(), &[true, true, true], calls.clone());
    let frame = Frame::blank(WIDTH, HEIGHT).unwrap();

    let annotation = annotator.annotate(&frame, false).unwrap();

    let rectangles = annotation.overlays.iter().filter(|o| o.is_rectangle()).count();
    assert_eq!(rectangles, 3);
    assert_eq!(count_kind(&annotation.overlays, TextKind::DominantEmotion), 0);
    assert_eq!(count_kind(&annotation.overlays, TextKind::EmotionScore), 0);
    assert_eq!(count_kind(&annotation.overlays, TextKind::Smile), 0);
    assert_eq!(people_count_text(&annotation.overlays), Some("People Count: 3"));
    assert_eq!(calls.borrow().len(), 0);
}

#[test]
fn test_smile_label_for_every_smiling_face() {
    let calls = SeenFrames::default();
    let smile = vec![DetectionBox::new(20, 40, 30, 15)];
    let mut annotator = annotator(faces(2), smile, &[], calls);
    let frame = Frame::blank(WIDTH, HEIGHT).unwrap();

    let annotation = annotator.annotate(&frame, false).unwrap();

    assert_eq!(count_kind(&annotation.overlays, TextKind::Smile), 2);
    assert_eq!(annotation.overlays[1], Overlay::smile(faces(2)[0]));
}

#[test]
fn test_classifier_failure_does_not_stop_later_faces() {
    let calls = SeenFrames::default();
    let smile = vec![DetectionBox::new(20, 40, 30, 15)];
    let mut annotator = annotator(faces(2), smile, &[false, true], calls.clone());
    let frame = Frame::blank(WIDTH, HEIGHT).unwrap();

    let annotation = annotator.annotate(&frame, true).unwrap();

    // One classifier call per face, each on the whole frame
    let full_frame = SeenFrame {
        size: (WIDTH, HEIGHT),
        lit_pixels: 0,
    };
    assert_eq!(*calls.borrow(), vec![full_frame, full_frame]);
    assert_eq!(annotation.people_count, 2);
    assert_eq!(count_kind(&annotation.overlays, TextKind::Smile), 2);
    assert_eq!(count_kind(&annotation.overlays, TextKind::DominantEmotion), 1);
    assert_eq!(
        count_kind(&annotation.overlays, TextKind::EmotionScore),
        EmotionState::ALL.len()
    );

    let second_face = faces(2)[1];
    assert!(annotation
        .overlays
        .contains(&Overlay::dominant_emotion(second_face, "happy")));
    assert!(annotation
        .overlays
        .contains(&Overlay::emotion_score(second_face, 3, "happy: 94.00".to_string())));
}

#[test]
fn test_classifier_sees_captured_frame_before_overlays() {
    let calls = SeenFrames::default();
    let smile = vec![DetectionBox::new(20, 40, 30, 15)];
    let source = ScriptedSource::new(&[true, true], Rc::default());
    let annotator = annotator(faces(3), smile, &[true, true, true, true, true, true], calls.clone());
    let mut video = VideoLoop::new(Box::new(source), annotator, TICK);
    let mut canvas = RecordingCanvas::default();
    video.click_emotion_button();

    let start = Instant::now();
    video.tick(start, &mut canvas).unwrap();
    video.tick(start + TICK, &mut canvas).unwrap();

    // Boxes and labels drawn for earlier faces never reach the classifier
    assert_eq!(calls.borrow().len(), 6);
    for seen in calls.borrow().iter() {
        assert_eq!(seen.size, (WIDTH, HEIGHT));
        assert_eq!(seen.lit_pixels, 0);
    }
}

#[test]
fn test_face_outside_frame_skips_smile_detection() {
    let calls = SeenFrames::default();
    let outside = vec![DetectionBox::new(WIDTH as i32 + 10, 0, 40, 40)];
    let mut annotator = annotator(outside, faces(1), &[], calls);
    let frame = Frame::blank(WIDTH, HEIGHT).unwrap();

    let annotation = annotator.annotate(&frame, false).unwrap();

    assert_eq!(annotation.people_count, 1);
    assert_eq!(count_kind(&annotation.overlays, TextKind::Smile), 0);
}

#[test]
fn test_capture_failure_keeps_previous_image() {
    let releases = Rc::new(Cell::new(0));
    let source = ScriptedSource::new(&[true, false], releases);
    let annotator = annotator(faces(1), Vec::new(), &[], Rc::default());
    let mut video = VideoLoop::new(Box::new(source), annotator, TICK);
    let mut canvas = RecordingCanvas::default();
    let shown = canvas.shown.clone();

    let start = Instant::now();
    let first = video.poll(start, &mut canvas).unwrap().unwrap();
    assert_eq!(first, TickOutcome::Presented { people_count: 1 });
    assert_eq!(shown.borrow().len(), 1);
    let presented = shown.borrow()[0].clone();
    assert_eq!(presented.dimensions(), (WIDTH, HEIGHT));

    // Not due yet
    assert!(video.poll(start, &mut canvas).is_none());

    let second = video.poll(start + TICK, &mut canvas).unwrap().unwrap();
    assert_eq!(second, TickOutcome::CaptureFailed);
    assert_eq!(shown.borrow().len(), 1);
    assert_eq!(shown.borrow()[0], presented);

    // Failed ticks are retried
    assert_eq!(video.time_until_next_tick(start + TICK), Some(TICK));
}

#[test]
fn test_presented_frame_carries_overlays() {
    let releases = Rc::new(Cell::new(0));
    let source = ScriptedSource::new(&[true], releases);
    let annotator = annotator(faces(1), Vec::new(), &[], Rc::default());
    let mut video = VideoLoop::new(Box::new(source), annotator, TICK);
    let mut canvas = RecordingCanvas::default();
    let shown = canvas.shown.clone();

    video.tick(Instant::now(), &mut canvas).unwrap();

    let image = &shown.borrow()[0];
    let face = faces(1)[0];
    // Face box color (89, 2, 236) in BGR is shown as RGB (236, 2, 89)
    assert_eq!(image.get_pixel(face.x as u32, face.y as u32).0, [236, 2, 89]);
    assert_eq!(image.get_pixel(face.x as u32 + 40, face.y as u32 + 40).0, [0, 0, 0]);
}

#[test]
fn test_emotion_button_round_trip() {
    let source = ScriptedSource::new(&[], Rc::default());
    let annotator = annotator(Vec::new(), Vec::new(), &[], Rc::default());
    let mut video = VideoLoop::new(Box::new(source), annotator, TICK);
    let initial_label = video.emotion_button_label();
    let initial_state = video.state();

    video.click_emotion_button();
    assert!(video.state().detect_emotion);
    assert_eq!(video.emotion_button_label(), "Turn Off Emotion Detection");

    video.click_emotion_button();
    assert_eq!(video.state(), initial_state);
    assert_eq!(video.emotion_button_label(), initial_label);
}

#[test]
fn test_close_releases_camera_once_and_stops_loop() {
    for detect_emotion in [false, true] {
        let releases = Rc::new(Cell::new(0));
        let source = ScriptedSource::new(&[true, true], releases.clone());
        let annotator = annotator(faces(1), Vec::new(), &[true, true], Rc::default());
        let mut video = VideoLoop::new(Box::new(source), annotator, TICK);
        let mut canvas = RecordingCanvas::default();

        if detect_emotion {
            video.click_emotion_button();
        }

        let start = Instant::now();
        video.poll(start, &mut canvas).unwrap().unwrap();

        video.close_camera();
        video.close_camera();

        assert_eq!(releases.get(), 1);
        assert!(!video.is_running());
        assert_eq!(video.time_until_next_tick(start), None);
        assert!(video.poll(start + TICK * 10, &mut canvas).is_none());

        drop(video);
        assert_eq!(releases.get(), 1);
    }
}

#[test]
fn test_drop_releases_unclosed_camera() {
    let releases = Rc::new(Cell::new(0));
    let source = ScriptedSource::new(&[], releases.clone());
    let annotator = annotator(Vec::new(), Vec::new(), &[], Rc::default());
    drop(VideoLoop::new(Box::new(source), annotator, TICK));
    assert_eq!(releases.get(), 1);
}
