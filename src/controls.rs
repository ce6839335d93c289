// Toggle state and the button controls that mutate it

use tracing::info;

/// Flags read by the capture loop each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppState {
    /// Cleared once by the close action and never set again.
    pub running: bool,
    pub detect_emotion: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            running: true,
            detect_emotion: false,
        }
    }
}

/// Action currently bound to the emotion button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    StartEmotionDetection,
    StopEmotionDetection,
}

/// The single emotion toggle control: a label plus the action a click triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmotionButton {
    action: ButtonAction,
}

impl Default for EmotionButton {
    fn default() -> Self {
        Self {
            action: ButtonAction::StartEmotionDetection,
        }
    }
}

impl EmotionButton {
    pub fn label(&self) -> &'static str {
        match self.action {
            ButtonAction::StartEmotionDetection => "Turn On Emotion Detection",
            ButtonAction::StopEmotionDetection => "Turn Off Emotion Detection",
        }
    }

    pub fn action(&self) -> ButtonAction {
        self.action
    }

    /// Runs the bound action against `state` and rebinds the control to the opposite one.
    pub fn click(&mut self, state: &mut AppState) {
        match self.action {
            ButtonAction::StartEmotionDetection => {
                state.detect_emotion = true;
                self.action = ButtonAction::StopEmotionDetection;
                info!("Emotion detection turned on");
            }
            ButtonAction::StopEmotionDetection => {
                state.detect_emotion = false;
                self.action = ButtonAction::StartEmotionDetection;
                info!("Emotion detection turned off");
            }
        }
    }
}

/// Label of the close control.
pub const CLOSE_BUTTON_LABEL: &str = "Close Camera";
