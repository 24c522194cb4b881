//! The emotion detection engine.
//!
//! Ties the rolling buffers, metric computation, classifier and smoother
//! together behind a small API: feed events in, ask for a reading.

use crate::collector::types::{KeyboardEvent, MouseEvent, SensorEvent};
use crate::config::{DetectorConfig, SourceConfig};
use crate::core::buffers::InteractionBuffers;
use crate::core::classifier::{classify, CognitiveLoad, EmotionalState, Signal};
use crate::core::features::{compute_metrics, InteractionMetrics};
use crate::core::smoothing::StateSmoother;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One detection result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionReading {
    pub id: Uuid,
    pub computed_at: DateTime<Utc>,
    /// Smoothed state (majority over recent readings)
    pub state: EmotionalState,
    /// State from this reading alone
    pub raw_state: EmotionalState,
    pub cognitive_load: CognitiveLoad,
    /// Smoothed confidence in [0, 1]
    pub confidence: f64,
    /// Signals that fired for this reading
    pub signals: Vec<Signal>,
    pub metrics: InteractionMetrics,
}

/// Heuristic emotion detector over keyboard and mouse rhythm.
#[derive(Debug, Clone)]
pub struct EmotionDetectionEngine {
    config: DetectorConfig,
    buffers: InteractionBuffers,
    smoother: StateSmoother,
    last_reading: Option<EmotionReading>,
}

impl Default for EmotionDetectionEngine {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl EmotionDetectionEngine {
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_sources(config, SourceConfig::default())
    }

    /// Create an engine that only listens to the given sources.
    pub fn with_sources(config: DetectorConfig, sources: SourceConfig) -> Self {
        Self {
            buffers: InteractionBuffers::new(&config, sources),
            smoother: StateSmoother::new(config.smoothing_window),
            config,
            last_reading: None,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn record_event(&mut self, event: &SensorEvent) {
        self.buffers.record(event);
    }

    /// Record a key press at the given time.
    pub fn record_keystroke_at(&mut self, timestamp: DateTime<Utc>, is_correction: bool) {
        let mut event = KeyboardEvent::at(timestamp, true);
        event.is_correction = is_correction;
        self.buffers.record_keyboard(&event);
    }

    /// Record a mouse movement delta at the given time.
    pub fn record_mouse_movement_at(&mut self, timestamp: DateTime<Utc>, delta_x: f64, delta_y: f64) {
        self.buffers
            .record_mouse(&MouseEvent::movement_at(timestamp, delta_x, delta_y));
    }

    /// Current metrics, without producing a reading.
    pub fn metrics(&self) -> InteractionMetrics {
        compute_metrics(&self.buffers, &self.config)
    }

    /// Number of samples currently buffered.
    pub fn sample_count(&self) -> usize {
        self.buffers.sample_count()
    }

    /// Classify the current buffers and fold the result into the smoothed state.
    pub fn detect(&mut self) -> EmotionReading {
        let metrics = self.metrics();
        let classification = classify(&metrics, &self.config);
        let (state, confidence) = self
            .smoother
            .push(classification.state, classification.confidence);

        let reading = EmotionReading {
            id: Uuid::new_v4(),
            computed_at: Utc::now(),
            state,
            raw_state: classification.state,
            cognitive_load: classification.cognitive_load,
            confidence,
            signals: classification.signals,
            metrics,
        };

        tracing::debug!(
            state = %reading.state,
            raw_state = %reading.raw_state,
            load = %reading.cognitive_load,
            confidence = reading.confidence,
            samples = reading.metrics.usable_samples(),
            "emotion reading computed"
        );

        self.last_reading = Some(reading.clone());
        reading
    }

    pub fn last_reading(&self) -> Option<&EmotionReading> {
        self.last_reading.as_ref()
    }

    /// Forget all samples, smoothing history and the last reading.
    pub fn reset(&mut self) {
        self.buffers.clear();
        self.smoother.clear();
        self.last_reading = None;
    }
}
