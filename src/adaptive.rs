//! Neuro-adaptive UI hints.
//!
//! Front-ends ask how to present themselves given the latest reading. The
//! answer is a small set of presentation knobs; rendering stays with the UI.

use crate::core::classifier::{CognitiveLoad, EmotionalState};
use crate::core::engine::EmotionReading;
use serde::{Deserialize, Serialize};

/// Readings below this confidence leave the UI in its default mode.
pub const MIN_ADAPTATION_CONFIDENCE: f64 = 0.4;

/// Visual theme family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Default,
    Calming,
    Focus,
    Energizing,
}

/// Presentation adjustments for the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiAdaptation {
    pub theme: Theme,
    /// Multiplier on animation speed (1.0 = unchanged)
    pub animation_scale: f64,
    pub reduce_notifications: bool,
    /// Short suggestion to surface, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Default for UiAdaptation {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            animation_scale: 1.0,
            reduce_notifications: false,
            suggestion: None,
        }
    }
}

impl UiAdaptation {
    /// Pick adjustments for a reading.
    pub fn for_reading(reading: &EmotionReading) -> Self {
        if reading.confidence < MIN_ADAPTATION_CONFIDENCE {
            return Self::default();
        }

        let mut adaptation = match reading.state {
            EmotionalState::Stressed | EmotionalState::Anxious => Self {
                theme: Theme::Calming,
                animation_scale: 0.5,
                reduce_notifications: true,
                suggestion: Some("Try a slow breath: in for 4, hold for 4, out for 6.".into()),
            },
            EmotionalState::Fatigued => Self {
                theme: Theme::Calming,
                animation_scale: 0.7,
                reduce_notifications: true,
                suggestion: Some("You seem tired. A short break or some water might help.".into()),
            },
            EmotionalState::Focused => Self {
                theme: Theme::Focus,
                animation_scale: 0.8,
                reduce_notifications: true,
                suggestion: None,
            },
            EmotionalState::Excited => Self {
                theme: Theme::Energizing,
                animation_scale: 1.2,
                reduce_notifications: false,
                suggestion: Some("Great energy. Want to capture it in a journal entry?".into()),
            },
            EmotionalState::Calm => Self {
                theme: Theme::Calming,
                animation_scale: 1.0,
                reduce_notifications: false,
                suggestion: None,
            },
            EmotionalState::Neutral => Self::default(),
        };

        if reading.cognitive_load == CognitiveLoad::High {
            adaptation.reduce_notifications = true;
            adaptation.animation_scale = adaptation.animation_scale.min(0.6);
        }

        adaptation
    }
}
