//! Privacy-preserving interaction event types.
//!
//! These types capture ONLY timing and magnitude information - never key identity,
//! typed content or cursor coordinates. The single key attribute retained is whether
//! a key belongs to the correction class (backspace/delete), which feeds the
//! error-rate heuristic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keyboard event capturing only timing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether this is a key press (true) or release (false)
    pub is_key_down: bool,
    /// Whether the key was a correction key (backspace/delete)
    #[serde(default)]
    pub is_correction: bool,
}

impl KeyboardEvent {
    pub fn new(is_key_down: bool) -> Self {
        Self::at(Utc::now(), is_key_down)
    }

    /// Create an event with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>, is_key_down: bool) -> Self {
        Self {
            timestamp,
            is_key_down,
            is_correction: false,
        }
    }

    /// Mark this event as a correction keystroke.
    pub fn correction(mut self) -> Self {
        self.is_correction = true;
        self
    }
}

/// Mouse event type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseEventType {
    Move,
    Click,
    Scroll,
}

/// A mouse event capturing only timing and magnitude information.
///
/// Privacy guarantee: No absolute coordinates are captured. Only movement
/// magnitudes are recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
    /// Type of mouse event
    pub event_type: MouseEventType,
    /// Movement magnitude (distance moved, not direction or absolute position).
    /// Only set for Move events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_magnitude: Option<f64>,
}

impl MouseEvent {
    /// Create a new mouse move event from a movement delta.
    pub fn movement(delta_x: f64, delta_y: f64) -> Self {
        Self::movement_at(Utc::now(), delta_x, delta_y)
    }

    /// Create a mouse move event with an explicit timestamp.
    pub fn movement_at(timestamp: DateTime<Utc>, delta_x: f64, delta_y: f64) -> Self {
        Self {
            timestamp,
            event_type: MouseEventType::Move,
            delta_magnitude: Some(delta_x.hypot(delta_y)),
        }
    }

    pub fn click() -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: MouseEventType::Click,
            delta_magnitude: None,
        }
    }

    pub fn scroll() -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: MouseEventType::Scroll,
            delta_magnitude: None,
        }
    }
}

/// Unified event type.
///
/// Serialized with an internal `type` tag:
/// `{"type":"keyboard","timestamp":"...","is_key_down":true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

impl SensorEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorEvent::Keyboard(e) => e.timestamp,
            SensorEvent::Mouse(e) => e.timestamp,
        }
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self, SensorEvent::Keyboard(_))
    }
}

impl From<KeyboardEvent> for SensorEvent {
    fn from(event: KeyboardEvent) -> Self {
        SensorEvent::Keyboard(event)
    }
}

impl From<MouseEvent> for SensorEvent {
    fn from(event: MouseEvent) -> Self {
        SensorEvent::Mouse(event)
    }
}
