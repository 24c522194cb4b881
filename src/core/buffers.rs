//! Rolling buffers of interaction samples.
//!
//! Unlike fixed time windows, the detector looks at the most recent N samples
//! of each kind. Older samples are evicted as new ones arrive, so memory stays
//! bounded no matter how long a session runs.

use crate::collector::types::{KeyboardEvent, MouseEvent, MouseEventType, SensorEvent};
use crate::config::{DetectorConfig, SourceConfig};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// A bounded FIFO buffer that evicts its oldest sample when full.
#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingBuffer<T> {
    /// Create a buffer holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, returning the evicted one if the buffer was full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Keystroke and mouse samples feeding the detector.
#[derive(Debug, Clone)]
pub struct InteractionBuffers {
    /// Milliseconds between consecutive key presses
    intervals: RollingBuffer<f64>,
    /// One flag per key press: was it a correction key
    corrections: RollingBuffer<bool>,
    /// Mouse movement magnitudes
    magnitudes: RollingBuffer<f64>,
    /// Time of the last key press, used to derive intervals
    last_key_down: Option<DateTime<Utc>>,
    idle_reset_ms: f64,
    sources: SourceConfig,
}

impl InteractionBuffers {
    pub fn new(config: &DetectorConfig, sources: SourceConfig) -> Self {
        Self {
            intervals: RollingBuffer::new(config.keystroke_buffer_size),
            corrections: RollingBuffer::new(config.keystroke_buffer_size),
            magnitudes: RollingBuffer::new(config.mouse_buffer_size),
            last_key_down: None,
            idle_reset_ms: config.idle_reset_ms,
            sources,
        }
    }

    /// Route an event into the matching buffer.
    pub fn record(&mut self, event: &SensorEvent) {
        match event {
            SensorEvent::Keyboard(e) => self.record_keyboard(e),
            SensorEvent::Mouse(e) => self.record_mouse(e),
        }
    }

    /// Record a keyboard event. Only key presses are sampled.
    pub fn record_keyboard(&mut self, event: &KeyboardEvent) {
        if !self.sources.keyboard || !event.is_key_down {
            return;
        }

        if let Some(last) = self.last_key_down {
            let interval_ms = (event.timestamp - last).num_milliseconds() as f64;
            // Out-of-order events keep the newer clock.
            if interval_ms < 0.0 {
                return;
            }
            if interval_ms > 0.0 && interval_ms <= self.idle_reset_ms {
                self.intervals.push(interval_ms);
            }
        }

        self.corrections.push(event.is_correction);
        self.last_key_down = Some(event.timestamp);
    }

    /// Record a mouse event. Only movements with a magnitude are sampled.
    pub fn record_mouse(&mut self, event: &MouseEvent) {
        if !self.sources.mouse || event.event_type != MouseEventType::Move {
            return;
        }
        if let Some(magnitude) = event.delta_magnitude.filter(|m| m.is_finite() && *m >= 0.0) {
            self.magnitudes.push(magnitude);
        }
    }

    pub fn intervals(&self) -> &RollingBuffer<f64> {
        &self.intervals
    }

    pub fn corrections(&self) -> &RollingBuffer<bool> {
        &self.corrections
    }

    pub fn magnitudes(&self) -> &RollingBuffer<f64> {
        &self.magnitudes
    }

    /// Total samples across keystroke intervals and mouse magnitudes.
    pub fn sample_count(&self) -> usize {
        self.intervals.len() + self.magnitudes.len()
    }

    /// Drop every sample and forget the interval clock.
    pub fn clear(&mut self) {
        self.intervals.clear();
        self.corrections.clear();
        self.magnitudes.clear();
        self.last_key_down = None;
    }
}
