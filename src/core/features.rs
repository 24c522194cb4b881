//! Metric computation from interaction buffers.
//!
//! All metrics are computed from timing and magnitude data only - never content.

use crate::config::DetectorConfig;
use crate::core::buffers::InteractionBuffers;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Coarse description of typing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingRhythm {
    /// Not enough keystrokes to judge
    #[default]
    Unknown,
    Steady,
    Erratic,
    Slow,
    Rapid,
}

/// Metrics derived from the current buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionMetrics {
    /// Whether enough keystroke intervals were available
    pub keyboard_ready: bool,
    /// Number of inter-keystroke intervals in the buffer
    pub keystroke_samples: usize,
    /// Mean inter-keystroke interval (ms)
    pub mean_interval_ms: f64,
    /// Population variance of intervals (ms²)
    pub interval_variance: f64,
    pub rhythm: TypingRhythm,
    /// Share of intervals longer than the pause threshold
    pub pause_ratio: f64,
    /// Share of key presses that were corrections
    pub error_rate: f64,
    /// Whether enough mouse movements were available
    pub mouse_ready: bool,
    pub mouse_samples: usize,
    pub mean_mouse_magnitude: f64,
    pub mouse_variance: f64,
    /// Coefficient of variation of movement magnitudes
    pub mouse_variation: f64,
    /// Share of movements below the micro-movement threshold
    pub micro_movement_ratio: f64,
}

impl InteractionMetrics {
    /// Samples that contribute to confidence.
    pub fn usable_samples(&self) -> usize {
        let keyboard = if self.keyboard_ready {
            self.keystroke_samples
        } else {
            0
        };
        let mouse = if self.mouse_ready {
            self.mouse_samples
        } else {
            0
        };
        keyboard + mouse
    }
}

/// Compute all metrics from the current buffers.
pub fn compute_metrics(buffers: &InteractionBuffers, config: &DetectorConfig) -> InteractionMetrics {
    let mut metrics = InteractionMetrics::default();
    compute_keyboard_metrics(buffers, config, &mut metrics);
    compute_mouse_metrics(buffers, config, &mut metrics);
    metrics
}

fn compute_keyboard_metrics(
    buffers: &InteractionBuffers,
    config: &DetectorConfig,
    metrics: &mut InteractionMetrics,
) {
    let intervals = buffers.intervals();
    metrics.keystroke_samples = intervals.len();
    if intervals.len() < config.min_samples {
        return;
    }

    metrics.keyboard_ready = true;
    metrics.mean_interval_ms = intervals.iter().mean();
    metrics.interval_variance = intervals.iter().population_variance();
    metrics.rhythm = classify_rhythm(
        metrics.mean_interval_ms,
        metrics.interval_variance,
        intervals.len(),
        config,
    );

    let pauses = intervals
        .iter()
        .filter(|&&i| i > config.pause_threshold_ms)
        .count();
    metrics.pause_ratio = pauses as f64 / intervals.len() as f64;

    let corrections = buffers.corrections();
    if !corrections.is_empty() {
        let count = corrections.iter().filter(|&&c| c).count();
        metrics.error_rate = count as f64 / corrections.len() as f64;
    }
}

fn compute_mouse_metrics(
    buffers: &InteractionBuffers,
    config: &DetectorConfig,
    metrics: &mut InteractionMetrics,
) {
    let magnitudes = buffers.magnitudes();
    metrics.mouse_samples = magnitudes.len();
    if magnitudes.len() < config.min_samples {
        return;
    }

    metrics.mouse_ready = true;
    metrics.mean_mouse_magnitude = magnitudes.iter().mean();
    metrics.mouse_variance = magnitudes.iter().population_variance();
    metrics.mouse_variation = if metrics.mean_mouse_magnitude > 0.0 {
        metrics.mouse_variance.sqrt() / metrics.mean_mouse_magnitude
    } else {
        0.0
    };

    let micro = magnitudes
        .iter()
        .filter(|&&m| m < config.thresholds.micro_movement_magnitude)
        .count();
    metrics.micro_movement_ratio = micro as f64 / magnitudes.len() as f64;
}

/// Classify typing rhythm by thresholding the interval mean and variance.
///
/// Variance is checked before the mean: an irregular typist is erratic
/// regardless of average speed.
pub fn classify_rhythm(
    mean_ms: f64,
    variance: f64,
    samples: usize,
    config: &DetectorConfig,
) -> TypingRhythm {
    let t = &config.thresholds;
    if samples < config.min_samples {
        TypingRhythm::Unknown
    } else if variance > t.erratic_variance {
        TypingRhythm::Erratic
    } else if mean_ms > t.slow_interval_ms {
        TypingRhythm::Slow
    } else if mean_ms < t.rapid_interval_ms {
        TypingRhythm::Rapid
    } else {
        TypingRhythm::Steady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{KeyboardEvent, MouseEvent};
    use crate::config::SourceConfig;
    use chrono::{Duration, Utc};

    fn buffers_with_intervals(intervals: &[i64], corrections: &[usize]) -> InteractionBuffers {
        let config = DetectorConfig::default();
        let mut buffers = InteractionBuffers::new(&config, SourceConfig::default());
        let mut t = Utc::now();
        let mut event = KeyboardEvent::at(t, true);
        buffers.record_keyboard(&event);
        for (i, interval) in intervals.iter().enumerate() {
            t += Duration::milliseconds(*interval);
            event = KeyboardEvent::at(t, true);
            if corrections.contains(&(i + 1)) {
                event = event.correction();
            }
            buffers.record_keyboard(&event);
        }
        buffers
    }

    #[test]
    fn test_too_few_samples_is_unknown() {
        let config = DetectorConfig::default();
        let buffers = buffers_with_intervals(&[200, 200, 200], &[]);
        let metrics = compute_metrics(&buffers, &config);

        assert!(!metrics.keyboard_ready);
        assert_eq!(metrics.keystroke_samples, 3);
        assert_eq!(metrics.rhythm, TypingRhythm::Unknown);
        assert_eq!(metrics.usable_samples(), 0);
    }

    #[test]
    fn test_steady_typing_metrics() {
        let config = DetectorConfig::default();
        let buffers = buffers_with_intervals(&[200; 10], &[]);
        let metrics = compute_metrics(&buffers, &config);

        assert!(metrics.keyboard_ready);
        assert!((metrics.mean_interval_ms - 200.0).abs() < 1e-9);
        assert!(metrics.interval_variance.abs() < 1e-9);
        assert_eq!(metrics.rhythm, TypingRhythm::Steady);
        assert_eq!(metrics.pause_ratio, 0.0);
        assert_eq!(metrics.error_rate, 0.0);
    }

    #[test]
    fn test_pause_and_error_ratios() {
        let config = DetectorConfig::default();
        // 10 intervals, 2 of them pauses; 11 key presses, 2 corrections
        let intervals = [200, 200, 3000, 200, 200, 200, 3000, 200, 200, 200];
        let buffers = buffers_with_intervals(&intervals, &[3, 7]);
        let metrics = compute_metrics(&buffers, &config);

        assert!((metrics.pause_ratio - 0.2).abs() < 1e-9);
        assert!((metrics.error_rate - 2.0 / 11.0).abs() < 1e-9);
        assert_eq!(metrics.rhythm, TypingRhythm::Erratic);
    }

    #[test]
    fn test_rhythm_thresholds() {
        let config = DetectorConfig::default();
        assert_eq!(classify_rhythm(200.0, 100_000.0, 10, &config), TypingRhythm::Erratic);
        assert_eq!(classify_rhythm(600.0, 1_000.0, 10, &config), TypingRhythm::Slow);
        assert_eq!(classify_rhythm(100.0, 1_000.0, 10, &config), TypingRhythm::Rapid);
        assert_eq!(classify_rhythm(250.0, 1_000.0, 10, &config), TypingRhythm::Steady);
        assert_eq!(classify_rhythm(250.0, 1_000.0, 2, &config), TypingRhythm::Unknown);
    }

    #[test]
    fn test_mouse_metrics() {
        let config = DetectorConfig::default();
        let mut buffers = InteractionBuffers::new(&config, SourceConfig::default());
        for magnitude in [1.0, 1.0, 10.0, 10.0, 10.0, 10.0] {
            buffers.record_mouse(&MouseEvent::movement(magnitude, 0.0));
        }
        let metrics = compute_metrics(&buffers, &config);

        assert!(metrics.mouse_ready);
        assert_eq!(metrics.mouse_samples, 6);
        assert!((metrics.mean_mouse_magnitude - 7.0).abs() < 1e-9);
        assert!((metrics.micro_movement_ratio - 2.0 / 6.0).abs() < 1e-9);
        // variance = (2*36 + 4*9) / 6 = 18
        assert!((metrics.mouse_variance - 18.0).abs() < 1e-9);
        assert!((metrics.mouse_variation - 18.0_f64.sqrt() / 7.0).abs() < 1e-9);
    }
}
